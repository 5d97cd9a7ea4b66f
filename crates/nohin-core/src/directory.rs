//! Vendor directory side file.
//!
//! Maps a short vendor keyword to the fixed recipient and vendor address
//! blocks printed on the invoice. Records are delimited text:
//! `keyword, recipient x3, vendor x5`. The ledger parser never consults it;
//! hosts look entries up with the vendor string captured from the headers.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Serialize;
use tracing::debug;

use crate::error::{DirectoryError, Result};

const RECIPIENT_LINES: usize = 3;
const VENDOR_LINES: usize = 5;

/// One directory record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VendorEntry {
    /// Substring matched against the header vendor string.
    pub keyword: String,
    pub recipient: [String; RECIPIENT_LINES],
    pub vendor: [String; VENDOR_LINES],
}

/// Keyword lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorDirectory {
    entries: Vec<VendorEntry>,
}

impl VendorDirectory {
    /// Read records from delimited text. Short records are padded with blanks.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> std::result::Result<Self, DirectoryError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .delimiter(delimiter)
            .from_reader(reader);

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }

            let keyword = record.get(0).unwrap_or_default().to_string();
            if keyword.is_empty() {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                return Err(DirectoryError::EmptyKeyword { line });
            }

            let field = |i: usize| record.get(i).unwrap_or_default().to_string();
            entries.push(VendorEntry {
                keyword,
                recipient: std::array::from_fn(|i| field(1 + i)),
                vendor: std::array::from_fn(|i| field(1 + RECIPIENT_LINES + i)),
            });
        }

        debug!("loaded {} vendor directory entries", entries.len());
        Ok(Self { entries })
    }

    /// Load a directory file.
    pub fn from_path(path: &Path, delimiter: u8) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file, delimiter)?)
    }

    /// First entry whose keyword occurs in `vendor`.
    pub fn lookup(&self, vendor: &str) -> Option<&VendorEntry> {
        self.entries
            .iter()
            .find(|entry| vendor.contains(entry.keyword.as_str()))
    }

    pub fn entries(&self) -> &[VendorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a delimiter option (`,`, `;`, `tab`, `\t`, ...).
pub fn parse_delimiter(s: &str) -> std::result::Result<u8, DirectoryError> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(DirectoryError::Delimiter(s.to_string())),
    }
}
