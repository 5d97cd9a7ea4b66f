//! Delivery ledger output models.
//!
//! Field names serialize in camelCase so the rendering layer can consume the
//! rows and summary directly.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::rules::tokens::{format_ledger_amount, parse_ledger_amount};

/// Result of parsing one ledger text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Line items in source order.
    pub rows: Vec<LineItem>,

    /// Trailing totals plus the consistency check.
    pub summary: Summary,

    /// Ledger month decoded from the first era header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<NaiveDate>,

    /// Diagnostics collected while parsing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A single delivered item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Vendor captured from the most recent header.
    pub vendor: String,

    /// 4-digit item code.
    pub code: String,

    /// Product name, reassembled across wrapped lines.
    pub name: String,

    /// Always empty; reserved for manual entry.
    pub spec: String,

    /// Unit of measure code.
    pub unit: String,

    pub quantity: String,

    pub unit_price: String,

    pub amount: String,

    pub note: String,
}

impl LineItem {
    /// Numeric value of the amount column, if any.
    pub fn amount_value(&self) -> Option<Decimal> {
        parse_ledger_amount(&self.amount)
    }
}

/// Summary section of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Pre-tax subtotal as printed.
    pub taxable_base: String,

    /// Consumption tax as printed.
    pub tax: String,

    /// Grand total as printed, sign marker stripped.
    pub total: String,

    /// Sum of all line item amounts.
    #[serde(with = "rust_decimal::serde::float")]
    pub computed_base_value: Decimal,

    /// `computed_base_value` in ledger style, blank when no amounts exist.
    pub computed_base_text: String,

    /// Non-empty when the printed and computed bases agree.
    pub match_mark: String,
}

impl Summary {
    /// Whether the printed taxable base matched the computed one.
    pub fn is_match(&self) -> bool {
        !self.match_mark.is_empty()
    }

    /// Check the summary and return any issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.taxable_base.is_empty() {
            issues.push("Missing taxable base".to_string());
        } else if !self.is_match() {
            issues.push(format!(
                "Taxable base ({}) differs from line item sum ({})",
                self.taxable_base, self.computed_base_text
            ));
        }

        if self.tax.is_empty() {
            issues.push("Missing tax".to_string());
        }

        if self.total.is_empty() {
            issues.push("Missing total".to_string());
        }

        issues
    }
}

/// Where a numeric field value came from.
///
/// Printed text always wins; `Computed` is produced only by the explicit
/// fallbacks of the quantity/price/amount rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Verbatim substring of the source text.
    Printed(String),
    /// Derived from other printed fields.
    Computed(Decimal),
}

impl Field {
    pub fn is_computed(&self) -> bool {
        matches!(self, Field::Computed(_))
    }

    /// Collapse to the text stored on a [`LineItem`].
    pub fn into_text(self) -> String {
        match self {
            Field::Printed(text) => text,
            Field::Computed(value) => format_ledger_amount(value),
        }
    }
}
