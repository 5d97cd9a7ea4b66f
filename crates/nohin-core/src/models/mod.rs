//! Data models for ledger extraction.

pub mod config;
pub mod ledger;
