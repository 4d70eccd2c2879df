use crate::models::{CountryDay, CountryDayMetrics};

/// Divide `numerator` by `denominator`, normalizing indeterminate results.
///
/// Returns 0 when the denominator is 0 or when the division produces an
/// infinite or NaN value. Every ratio in the output table goes through this
/// helper, so non-finite values never propagate downstream.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Fractional change from `previous` to `current`.
///
/// Returns 0 when there is no previous value (first row of a country's
/// series) or when the previous value is 0.
pub fn pct_change(current: f64, previous: Option<f64>) -> f64 {
    match previous {
        Some(prev) => safe_ratio(current - prev, prev),
        None => 0.0,
    }
}

// ── MetricsCalculator ─────────────────────────────────────────────────────────

/// Stateless helper deriving the day-over-day metric table from country-day
/// aggregates.
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Compute per-country day-over-day metrics.
    ///
    /// Sorts the aggregates by `(country, date)` ascending, then folds over
    /// each country's sequence carrying the previous row: the first row of a
    /// country gets 0 for both pct-change fields. Output rows keep the
    /// `(country, date)` ordering.
    pub fn derive(mut aggregates: Vec<CountryDay>) -> Vec<CountryDayMetrics> {
        aggregates.sort_by(|a, b| a.country.cmp(&b.country).then(a.date.cmp(&b.date)));

        let mut rows: Vec<CountryDayMetrics> = Vec::with_capacity(aggregates.len());
        let mut previous: Option<CountryDay> = None;

        for day in aggregates {
            let prev = previous
                .as_ref()
                .filter(|p| p.country == day.country);

            let new_confirmed_pct =
                pct_change(day.confirmed as f64, prev.map(|p| p.confirmed as f64));
            let new_outstanding_pct =
                pct_change(day.outstanding as f64, prev.map(|p| p.outstanding as f64));

            let closed = day.confirmed as f64 - day.recovered as f64;
            let recovered_ratio = safe_ratio(day.recovered as f64, closed);
            let death_ratio = safe_ratio(day.deaths as f64, closed);
            let death_over_recovered_ratio =
                safe_ratio(day.deaths as f64, day.recovered as f64);

            rows.push(CountryDayMetrics {
                date: day.date,
                country: day.country.clone(),
                confirmed: day.confirmed,
                deaths: day.deaths,
                recovered: day.recovered,
                outstanding: day.outstanding,
                new_confirmed_pct,
                new_outstanding_pct,
                recovered_ratio,
                death_ratio,
                death_over_recovered_ratio,
            });
            previous = Some(day);
        }

        rows
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
