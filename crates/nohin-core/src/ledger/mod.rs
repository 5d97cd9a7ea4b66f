//! Delivery ledger extraction module.

mod parser;
pub mod rules;

pub use parser::LedgerParser;

use crate::models::ledger::Extraction;

/// Trait for ledger extractors.
pub trait LedgerExtractor {
    /// Extract rows and summary from ledger text. Never fails; fields that
    /// cannot be recovered are left blank.
    fn extract(&self, text: &str) -> Extraction;
}
