//! Core library for delivery ledger extraction.
//!
//! This crate provides:
//! - Heuristic recovery of line items from copy-pasted ledger text
//! - Summary extraction (taxable base, tax, total) and a consistency check
//! - Configuration of the ledger's literal markers
//! - The vendor directory lookup used by rendering hosts

pub mod directory;
pub mod error;
pub mod ledger;
pub mod models;

pub use directory::{VendorDirectory, VendorEntry};
pub use error::{DirectoryError, LedgerError, Result};
pub use ledger::{LedgerExtractor, LedgerParser};
pub use models::config::{ExtractionConfig, LedgerConfig, LedgerFormat, TwoTokenPolicy};
pub use models::ledger::{Extraction, Field, LineItem, Summary};

/// Parse ledger text with the default configuration.
pub fn parse(text: &str) -> Extraction {
    LedgerParser::new().parse(text)
}
