use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row read from one daily snapshot file.
///
/// The `date` is taken from the snapshot's filename, not from row content.
/// Counts absent from the source file are read as 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Report date encoded in the snapshot filename.
    pub date: NaiveDate,
    /// Sub-national region label (state / province), when reported.
    #[serde(default)]
    pub province: Option<String>,
    /// Raw country / region label as it appears in the source (may be empty).
    #[serde(default)]
    pub country: String,
    /// Cumulative confirmed cases.
    #[serde(default)]
    pub confirmed: u64,
    /// Cumulative deaths.
    #[serde(default)]
    pub deaths: u64,
    /// Cumulative recoveries.
    #[serde(default)]
    pub recovered: u64,
}

/// Case counts for one canonical country on one report date.
///
/// Produced by grouping [`CaseRecord`]s on `(date, country)` and summing;
/// unique per key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryDay {
    /// Report date.
    pub date: NaiveDate,
    /// Canonical country name.
    pub country: String,
    /// Summed confirmed cases.
    pub confirmed: u64,
    /// Summed deaths.
    pub deaths: u64,
    /// Summed recoveries.
    pub recovered: u64,
    /// `confirmed - recovered - deaths`.
    ///
    /// Negative only when the source data is inconsistent (deaths plus
    /// recoveries exceed confirmed, typically from reporting lag). This is a
    /// data-quality signal, not a pipeline error.
    pub outstanding: i64,
}

impl CountryDay {
    /// An empty aggregate for the given key, ready to accumulate records.
    pub fn empty(country: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            date,
            country: country.into(),
            confirmed: 0,
            deaths: 0,
            recovered: 0,
            outstanding: 0,
        }
    }

    /// Add one record's counts to the running sums and refresh `outstanding`.
    pub fn add_record(&mut self, record: &CaseRecord) {
        self.confirmed += record.confirmed;
        self.deaths += record.deaths;
        self.recovered += record.recovered;
        self.outstanding =
            self.confirmed as i64 - self.recovered as i64 - self.deaths as i64;
    }
}

/// One output row of the pipeline: a [`CountryDay`] extended with the derived
/// day-over-day metrics.
///
/// All ratio fields are finite for every row; indeterminate divisions
/// (`0/0`, `x/0`) are normalized to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryDayMetrics {
    /// Report date.
    pub date: NaiveDate,
    /// Canonical country name.
    pub country: String,
    /// Summed confirmed cases.
    pub confirmed: u64,
    /// Summed deaths.
    pub deaths: u64,
    /// Summed recoveries.
    pub recovered: u64,
    /// `confirmed - recovered - deaths`.
    pub outstanding: i64,
    /// Fractional day-over-day change in `confirmed`; 0 on the first day of
    /// a country's series or when the prior value was 0.
    pub new_confirmed_pct: f64,
    /// Fractional day-over-day change in `outstanding`, same conventions.
    pub new_outstanding_pct: f64,
    /// `recovered / (confirmed - recovered)`.
    pub recovered_ratio: f64,
    /// `deaths / (confirmed - recovered)`.
    pub death_ratio: f64,
    /// `deaths / recovered`.
    pub death_over_recovered_ratio: f64,
}
