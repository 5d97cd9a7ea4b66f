//! Subcommands of the `nohin` binary.

pub mod batch;
pub mod config;
pub mod parse;
