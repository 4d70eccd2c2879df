//! Rendering of the derived metrics table.
//!
//! Presentation only: every format consumes the pipeline's output rows
//! as-is. Charting is left to external consumers of the CSV / JSON forms.

use std::io::Write;

use comfy_table::{
    presets::NOTHING, Attribute, Cell, ContentArrangement, Table, TableComponent,
};

use trend_core::models::CountryDayMetrics;

/// Keep only rows for the given countries; all rows when the filter is empty.
pub fn filter_countries(
    rows: Vec<CountryDayMetrics>,
    countries: &[String],
) -> Vec<CountryDayMetrics> {
    if countries.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| countries.iter().any(|c| c == &row.country))
        .collect()
}

/// Print the metrics table to stdout, capped at `limit` rows when given.
pub fn print_table(rows: &[CountryDayMetrics], limit: Option<usize>) {
    let shown = match limit {
        Some(max) => &rows[..rows.len().min(max)],
        None => rows,
    };

    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Date").add_attribute(Attribute::Bold),
            Cell::new("Country").add_attribute(Attribute::Bold),
            Cell::new("Confirmed").add_attribute(Attribute::Bold),
            Cell::new("Deaths").add_attribute(Attribute::Bold),
            Cell::new("Recovered").add_attribute(Attribute::Bold),
            Cell::new("Outstanding").add_attribute(Attribute::Bold),
            Cell::new("New %").add_attribute(Attribute::Bold),
            Cell::new("Outst. %").add_attribute(Attribute::Bold),
            Cell::new("Recov. ratio").add_attribute(Attribute::Bold),
            Cell::new("Death ratio").add_attribute(Attribute::Bold),
            Cell::new("Death/Recov.").add_attribute(Attribute::Bold),
        ])
        .set_style(TableComponent::BottomBorder, '─')
        .set_style(TableComponent::MiddleHeaderIntersections, '─')
        .set_style(TableComponent::HeaderLines, '─')
        .set_style(TableComponent::BottomBorderIntersections, '─')
        .set_style(TableComponent::TopBorder, '─')
        .set_style(TableComponent::TopBorderIntersections, '─');

    for row in shown {
        table.add_row(vec![
            row.date.to_string(),
            row.country.clone(),
            row.confirmed.to_string(),
            row.deaths.to_string(),
            row.recovered.to_string(),
            row.outstanding.to_string(),
            format!("{:.4}", row.new_confirmed_pct),
            format!("{:.4}", row.new_outstanding_pct),
            format!("{:.4}", row.recovered_ratio),
            format!("{:.4}", row.death_ratio),
            format!("{:.4}", row.death_over_recovered_ratio),
        ]);
    }

    println!("\n{}", table);
    if shown.len() < rows.len() {
        println!("{} of {} rows shown", shown.len(), rows.len());
    }
}

/// Write the metrics table as CSV (with a header row).
pub fn write_csv<W: Write>(writer: W, rows: &[CountryDayMetrics]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the metrics table as a pretty-printed JSON array.
pub fn write_json<W: Write>(writer: W, rows: &[CountryDayMetrics]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, rows)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
