mod bootstrap;
mod output;

use anyhow::{bail, Result};
use clap::Parser;
use trend_core::settings::Settings;
use trend_data::analysis::run_pipeline;

fn main() -> Result<()> {
    let settings = Settings::parse();
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("epi-trend v{} starting", env!("CARGO_PKG_VERSION"));

    let data_path = match settings.data_path.clone() {
        Some(path) => path,
        None => match bootstrap::discover_data_path() {
            Some(path) => path,
            None => bail!(
                "no data path given and no daily-reports checkout found in the default locations"
            ),
        },
    };
    tracing::info!("Loading daily cases from: {}", data_path.display());

    let result = run_pipeline(&data_path)?;
    tracing::info!(
        "Derived {} rows across {} countries from {} files",
        result.metadata.rows,
        result.metadata.countries,
        result.metadata.files_read
    );
    if result.metadata.negative_outstanding_rows > 0 {
        tracing::warn!(
            "{} rows report more recoveries plus deaths than confirmed cases",
            result.metadata.negative_outstanding_rows
        );
    }

    let rows = output::filter_countries(result.rows, &settings.countries);

    match settings.format.as_str() {
        "csv" => output::write_csv(std::io::stdout(), &rows)?,
        "json" => output::write_json(std::io::stdout(), &rows)?,
        _ => output::print_table(&rows, settings.limit),
    }

    Ok(())
}
