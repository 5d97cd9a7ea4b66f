//! Line classification against the ledger's literal markers.

use chrono::NaiveDate;

use crate::models::config::LedgerFormat;

use super::era::EraExtractor;
use super::normalize::compact;
use super::patterns::ITEM_CODE;
use super::FieldExtractor;

/// Structural role of a normalized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    /// Era-year-month header preceding a vendor line.
    EraHeader(NaiveDate),
    /// Vendor line captured after an era header.
    Vendor(String),
    /// Ledger title repeated on each page.
    Title,
    /// Line carrying the taxable-base label.
    TaxableBase,
    /// End-of-ledger marker.
    RemainderBlank,
    /// Line anchored by an item code.
    ItemCode {
        code: String,
        /// Byte offset of the code in the line.
        code_start: usize,
        /// Byte offset just past the code.
        tail_start: usize,
    },
    Text,
}

/// Slots of the trailing summary section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySlot {
    TaxableBase,
    Total,
    Tax,
}

/// Matches lines against a [`LedgerFormat`].
pub struct Markers<'a> {
    format: &'a LedgerFormat,
    eras: EraExtractor<'a>,
}

impl<'a> Markers<'a> {
    pub fn new(format: &'a LedgerFormat) -> Self {
        Self {
            format,
            eras: EraExtractor::new(&format.eras),
        }
    }

    pub fn format(&self) -> &'a LedgerFormat {
        self.format
    }

    /// Classify a line without context. Vendor lines depend on the preceding
    /// header and are resolved by the segmenter.
    pub fn classify(&self, line: &str) -> LineKind {
        if line.trim().is_empty() {
            return LineKind::Blank;
        }

        if let Some(date) = self.eras.extract(line) {
            return LineKind::EraHeader(date);
        }

        let compacted = compact(line);
        if contains_any(&compacted, &self.format.remainder_blank) {
            return LineKind::RemainderBlank;
        }
        if contains_any(&compacted, &self.format.titles) {
            return LineKind::Title;
        }
        if contains_any(&compacted, &self.format.taxable_base_labels) {
            return LineKind::TaxableBase;
        }

        if let Some(caps) = ITEM_CODE.captures(line) {
            if let Some(code) = caps.get(1) {
                return LineKind::ItemCode {
                    code: code.as_str().to_string(),
                    code_start: code.start(),
                    tail_start: code.end(),
                };
            }
        }

        LineKind::Text
    }

    pub fn is_remainder_blank(&self, line: &str) -> bool {
        contains_any(&compact(line), &self.format.remainder_blank)
    }

    /// Summary slot named by a label on the line, if any.
    pub fn summary_slot(&self, line: &str) -> Option<SummarySlot> {
        let compacted = compact(line);
        if contains_any(&compacted, &self.format.taxable_base_labels) {
            Some(SummarySlot::TaxableBase)
        } else if contains_any(&compacted, &self.format.tax_labels) {
            Some(SummarySlot::Tax)
        } else if contains_any(&compacted, &self.format.total_labels) {
            Some(SummarySlot::Total)
        } else {
            None
        }
    }
}

fn contains_any(compacted: &str, phrases: &[String]) -> bool {
    phrases
        .iter()
        .filter(|phrase| !phrase.is_empty())
        .any(|phrase| compacted.contains(compact(phrase).as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify() {
        let format = LedgerFormat::default();
        let markers = Markers::new(&format);

        assert_eq!(markers.classify("   "), LineKind::Blank);
        assert_eq!(
            markers.classify("令和6年10月分"),
            LineKind::EraHeader(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap())
        );
        assert_eq!(markers.classify("以 下 余 白"), LineKind::RemainderBlank);
        assert_eq!(markers.classify("納 品 書"), LineKind::Title);
        assert_eq!(markers.classify("課税対象額 969,582.00"), LineKind::TaxableBase);
        assert_eq!(
            markers.classify("0003 苺タルト"),
            LineKind::ItemCode {
                code: "0003".to_string(),
                code_start: 0,
                tail_start: 4,
            }
        );
        assert_eq!(markers.classify("苺タルト"), LineKind::Text);
        assert_eq!(markers.classify("3600.00"), LineKind::Text);
    }

    #[test]
    fn test_summary_slot() {
        let format = LedgerFormat::default();
        let markers = Markers::new(&format);

        assert_eq!(
            markers.summary_slot("課税対象額 969,582.00"),
            Some(SummarySlot::TaxableBase)
        );
        assert_eq!(markers.summary_slot("消費税 77,566"), Some(SummarySlot::Tax));
        assert_eq!(
            markers.summary_slot("税込合計 \\1,047,148-"),
            Some(SummarySlot::Total)
        );
        assert_eq!(
            markers.summary_slot("税抜合計 969,582.00"),
            Some(SummarySlot::TaxableBase)
        );
        assert_eq!(markers.summary_slot("1,047,148"), None);
    }

    #[test]
    fn test_is_remainder_blank() {
        let format = LedgerFormat::default();
        let markers = Markers::new(&format);
        assert!(markers.is_remainder_blank("　　以下余白　　"));
        assert!(!markers.is_remainder_blank("余白"));
    }
}
