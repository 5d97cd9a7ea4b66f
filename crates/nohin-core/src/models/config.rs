//! Configuration structures for the ledger parser.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Main configuration for the nohin pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Literal markers of the ledger format.
    pub format: LedgerFormat,

    /// Heuristic thresholds and policies.
    pub extraction: ExtractionConfig,
}

/// Closed set of literals tied to one ledger layout.
///
/// Supporting a different printed format means substituting this table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerFormat {
    /// Unit-of-measure codes (2-3 letters).
    pub unit_codes: Vec<String>,

    /// End-of-ledger phrases.
    pub remainder_blank: Vec<String>,

    /// Ledger title lines repeated on every page.
    pub titles: Vec<String>,

    /// Labels of the taxable base line.
    pub taxable_base_labels: Vec<String>,

    /// Labels of the tax line.
    pub tax_labels: Vec<String>,

    /// Labels of the grand total line.
    pub total_labels: Vec<String>,

    /// Currency glyphs that may prefix a number.
    pub currency_glyphs: Vec<char>,

    /// Japanese eras recognized in vendor headers.
    pub eras: Vec<Era>,

    /// Marker written to the summary when the bases agree.
    pub match_mark: String,
}

impl Default for LedgerFormat {
    fn default() -> Self {
        Self {
            unit_codes: [
                "EA", "PC", "PCS", "KG", "CS", "CT", "BX", "BOX", "PK", "PAC", "BG", "BT", "SET",
                "DZ",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            remainder_blank: vec!["以下余白".to_string()],
            titles: vec!["納品書".to_string(), "納品台帳".to_string()],
            taxable_base_labels: ["課税対象額", "税抜合計", "税抜金額"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            tax_labels: vec!["消費税".to_string()],
            total_labels: vec!["合計".to_string()],
            currency_glyphs: vec!['¥', '￥', '\\'],
            eras: vec![
                Era::new("令和", 2019),
                Era::new("平成", 1989),
                Era::new("昭和", 1926),
            ],
            match_mark: "○".to_string(),
        }
    }
}

impl LedgerFormat {
    /// Unit codes ordered so longer codes are tried first (`PCS` before `CS`).
    pub fn unit_codes_longest_first(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.unit_codes.iter().map(String::as_str).collect();
        codes.sort_by(|a, b| b.len().cmp(&a.len()));
        codes
    }
}

/// A Japanese era and the Gregorian year of its first year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Era {
    pub name: String,
    pub first_year: i32,
}

impl Era {
    pub fn new(name: impl Into<String>, first_year: i32) -> Self {
        Self {
            name: name.into(),
            first_year,
        }
    }
}

/// How a block with exactly two numeric tokens is classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TwoTokenPolicy {
    /// Smaller is the quantity, larger the amount, price left blank.
    #[default]
    AmountOnly,
    /// Smaller is the quantity, larger the price, amount computed.
    ComputedAmount,
}

/// Heuristic thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Two-token block classification.
    pub two_token_policy: TwoTokenPolicy,

    /// Maximum |quantity x price - amount| accepted by the best-fit search.
    pub pair_tolerance: Decimal,

    /// Maximum |taxable base - computed base| for the match marker.
    pub match_tolerance: Decimal,

    /// Lines scanned for the summary when no remainder-blank marker exists.
    pub summary_fallback_lines: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            two_token_policy: TwoTokenPolicy::default(),
            pair_tolerance: Decimal::new(5, 1),
            match_tolerance: Decimal::new(5, 1),
            summary_fallback_lines: 10,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
