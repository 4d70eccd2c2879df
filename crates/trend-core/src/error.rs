use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the epi-trend pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A snapshot filename does not decompose into a `MM-DD-YYYY` date.
    #[error("Snapshot filename does not encode a date: {0}")]
    MalformedFilename(String),

    /// A snapshot file's content could not be parsed as CSV.
    #[error("Failed to parse snapshot {path}: {source}")]
    UnreadableSnapshot {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The expected data directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No snapshot CSV files were found under the given directory.
    #[error("No snapshot files found in {0}")]
    NoSnapshotFiles(PathBuf),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the epi-trend crates.
pub type Result<T> = std::result::Result<T, PipelineError>;
