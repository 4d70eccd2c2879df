//! Country-day aggregation of normalized case records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::warn;

use trend_core::models::{CaseRecord, CountryDay};

// ── DailyAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that groups case records by (date, country).
pub struct DailyAggregator;

impl DailyAggregator {
    /// Group `records` by their `(date, country)` key and sum the counts.
    ///
    /// Every record lands in exactly one group; the output has exactly one
    /// row per key present in the input. The map is keyed `(country, date)`
    /// so the returned rows come out already sorted the way the metric
    /// deriver consumes them.
    ///
    /// A negative `outstanding` (deaths plus recoveries exceeding confirmed)
    /// is passed through unchanged but logged as a data-quality warning.
    pub fn aggregate(records: &[CaseRecord]) -> Vec<CountryDay> {
        // Use BTreeMap for automatically sorted keys.
        let mut map: BTreeMap<(String, NaiveDate), CountryDay> = BTreeMap::new();

        for record in records {
            map.entry((record.country.clone(), record.date))
                .or_insert_with(|| CountryDay::empty(record.country.clone(), record.date))
                .add_record(record);
        }

        let rows: Vec<CountryDay> = map.into_values().collect();
        for row in &rows {
            if row.outstanding < 0 {
                warn!(
                    "Inconsistent counts for {} on {}: outstanding {} (confirmed {}, recovered {}, deaths {})",
                    row.country, row.date, row.outstanding, row.confirmed, row.recovered, row.deaths
                );
            }
        }

        rows
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
