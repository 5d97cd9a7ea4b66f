//! Error types for the nohin-core library.
//!
//! Ledger parsing itself never fails; these cover the ambient surfaces around
//! it (configuration files and the vendor directory side file).

use thiserror::Error;

/// Main error type for the nohin library.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Vendor directory loading error.
    #[error("vendor directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Configuration could not be (de)serialized.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the vendor directory side file.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// The delimited text could not be read.
    #[error("failed to read record: {0}")]
    Csv(#[from] csv::Error),

    /// A record had no keyword column.
    #[error("record {line} has an empty keyword")]
    EmptyKeyword { line: u64 },

    /// The delimiter is not a single byte.
    #[error("unsupported delimiter: {0:?}")]
    Delimiter(String),
}

/// Result type for the nohin library.
pub type Result<T> = std::result::Result<T, LedgerError>;
