//! Trailing totals and the taxable-base consistency check.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::ledger::{LineItem, Summary};

use super::markers::{Markers, SummarySlot};
use super::tokens::{format_ledger_amount, parse_ledger_amount, strip_decorations, NumberTokenExtractor};
use super::FieldExtractor;

/// Summary values exactly as printed (decorations stripped).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintedSummary {
    pub taxable_base: String,
    pub total: String,
    pub tax: String,
}

impl PrintedSummary {
    pub fn is_empty(&self) -> bool {
        self.taxable_base.is_empty() && self.total.is_empty() && self.tax.is_empty()
    }

    fn slot_mut(&mut self, slot: SummarySlot) -> &mut String {
        match slot {
            SummarySlot::TaxableBase => &mut self.taxable_base,
            SummarySlot::Total => &mut self.total,
            SummarySlot::Tax => &mut self.tax,
        }
    }
}

/// Positional order of unlabeled summary lines.
const POSITIONAL: [SummarySlot; 3] = [SummarySlot::TaxableBase, SummarySlot::Total, SummarySlot::Tax];

/// Locates the summary section after the last remainder-blank marker.
pub struct SummaryExtractor<'a> {
    markers: &'a Markers<'a>,
    lexer: &'a NumberTokenExtractor<'a>,
    fallback_lines: usize,
}

impl<'a> SummaryExtractor<'a> {
    pub fn new(
        markers: &'a Markers<'a>,
        lexer: &'a NumberTokenExtractor<'a>,
        fallback_lines: usize,
    ) -> Self {
        Self {
            markers,
            lexer,
            fallback_lines,
        }
    }

    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> PrintedSummary {
        let start = match lines
            .iter()
            .rposition(|line| self.markers.is_remainder_blank(line.as_ref()))
        {
            Some(marker) => marker + 1,
            None => {
                debug!("no remainder-blank marker, scanning the last {} lines", self.fallback_lines);
                lines.len().saturating_sub(self.fallback_lines)
            }
        };

        // Final numeric token of each line, with the label it carries.
        let collected: Vec<(Option<SummarySlot>, String)> = lines[start..]
            .iter()
            .filter_map(|line| {
                let line = line.as_ref();
                let token = self.lexer.extract_all(line).pop()?;
                Some((self.markers.summary_slot(line), token.text))
            })
            .take(POSITIONAL.len())
            .collect();

        // A label only counts when no other summary line carries the same
        // one (`合計` also matches inside `税抜合計` and `税込合計`).
        let labeled = |slot: &Option<SummarySlot>| {
            slot.filter(|s| {
                collected
                    .iter()
                    .filter(|(other, _)| *other == Some(*s))
                    .count()
                    == 1
            })
        };

        let glyphs = &self.markers.format().currency_glyphs;
        let mut summary = PrintedSummary::default();
        let mut filled: Vec<SummarySlot> = Vec::new();

        for (slot, text) in &collected {
            if let Some(slot) = labeled(slot) {
                *summary.slot_mut(slot) = strip_decorations(text, glyphs);
                filled.push(slot);
            }
        }

        // Unlabeled values keep their printed position when it is free.
        let mut pending: Vec<&str> = Vec::new();
        for (position, (slot, text)) in collected.iter().enumerate() {
            if labeled(slot).is_some() {
                continue;
            }
            let positional = POSITIONAL[position];
            if filled.contains(&positional) {
                pending.push(text);
            } else {
                *summary.slot_mut(positional) = strip_decorations(text, glyphs);
                filled.push(positional);
            }
        }

        let open_slots = POSITIONAL.iter().filter(|slot| !filled.contains(slot));
        for (slot, text) in open_slots.zip(pending) {
            *summary.slot_mut(*slot) = strip_decorations(text, glyphs);
        }

        summary
    }
}

/// Compares the printed taxable base with the sum of line amounts.
pub struct ConsistencyChecker<'a> {
    tolerance: Decimal,
    mark: &'a str,
}

impl<'a> ConsistencyChecker<'a> {
    pub fn new(tolerance: Decimal, mark: &'a str) -> Self {
        Self { tolerance, mark }
    }

    pub fn check(&self, printed: PrintedSummary, rows: &[LineItem]) -> Summary {
        let amounts: Vec<Decimal> = rows.iter().filter_map(LineItem::amount_value).collect();
        let computed = amounts
            .iter()
            .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(*amount))
            .unwrap_or(Decimal::MAX);

        let computed_base_text = if amounts.is_empty() {
            String::new()
        } else {
            format_ledger_amount(computed)
        };

        let matched = parse_ledger_amount(&printed.taxable_base)
            .is_some_and(|base| (base - computed).abs() < self.tolerance);
        debug!(
            "taxable base {:?} vs computed {} (match: {})",
            printed.taxable_base, computed, matched
        );

        Summary {
            taxable_base: printed.taxable_base,
            tax: printed.tax,
            total: printed.total,
            computed_base_value: computed,
            computed_base_text,
            match_mark: if matched {
                self.mark.to_string()
            } else {
                String::new()
            },
        }
    }
}
