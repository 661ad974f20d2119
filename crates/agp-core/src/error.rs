use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the AGP report crates.
#[derive(Error, Debug)]
pub enum AgpError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input table is missing a required column or sheet.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A cell in the input table could not be interpreted.
    ///
    /// `row` is the 1-based row number in the source table, header included.
    #[error("Parse error at row {row}: {message}")]
    Parse { row: usize, message: String },

    /// An aggregation was requested over a series with no readings.
    #[error("Cannot aggregate an empty series")]
    EmptySeries,

    /// A recompute was requested before any dataset was loaded.
    #[error("No dataset loaded")]
    NoData,

    /// The spreadsheet container could not be decoded.
    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    /// The delimited text could not be decoded.
    #[error("Failed to read CSV: {0}")]
    Csv(String),

    /// The embedded record store reported an error.
    #[error("Record store error: {0}")]
    Store(String),

    /// A JSON document could not be parsed or written.
    #[error("Failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AgpError {
    /// Build a [`AgpError::Parse`] for the given 1-based row.
    pub fn parse(row: usize, message: impl Into<String>) -> Self {
        AgpError::Parse {
            row,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the AGP crates.
pub type Result<T> = std::result::Result<T, AgpError>;
