use clap::Parser;
use std::path::PathBuf;

/// Country-level daily case-trend pipeline
#[derive(Parser, Debug, Clone)]
#[command(
    name = "epi-trend",
    about = "Aggregate daily case snapshots into country-level trend metrics",
    version
)]
pub struct Settings {
    /// Root of the daily-reports data checkout (discovered if omitted)
    pub data_path: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "csv", "json"])]
    pub format: String,

    /// Restrict output to the given country (repeatable)
    #[arg(long = "country", value_name = "NAME")]
    pub countries: Vec<String>,

    /// Maximum number of rows to print
    #[arg(long)]
    pub limit: Option<usize>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path (stderr when omitted)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
