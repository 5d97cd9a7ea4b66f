//! Heuristic delivery ledger parser.

use tracing::{debug, info};

use crate::models::config::{LedgerConfig, TwoTokenPolicy};
use crate::models::ledger::{Extraction, Field, LineItem};

use super::rules::{
    normalize_text, segment, Block, BlockTokens, ConsistencyChecker, Disambiguator,
    FieldExtractor, Markers, NameAssembler, NumberTokenExtractor, SummaryExtractor,
};
use super::LedgerExtractor;

/// Rule-based parser for copy-pasted delivery ledgers.
///
/// Parsing is a pure function of the input text: the parser holds only its
/// configuration and can be shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct LedgerParser {
    config: LedgerConfig,
}

impl LedgerParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a full configuration.
    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set how two-number blocks are read.
    pub fn with_two_token_policy(mut self, policy: TwoTokenPolicy) -> Self {
        self.config.extraction.two_token_policy = policy;
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Parse a ledger text into rows and summary.
    pub fn parse(&self, text: &str) -> Extraction {
        info!("Parsing ledger from {} characters of text", text.chars().count());

        if text.trim().is_empty() {
            debug!("empty input, nothing to extract");
            return Extraction::default();
        }

        let format = &self.config.format;
        let extraction = &self.config.extraction;

        let lines = normalize_text(text);
        let markers = Markers::new(format);
        let lexer = NumberTokenExtractor::new(&format.currency_glyphs);
        let names = NameAssembler::new(&markers, &lexer);
        let disambiguator = Disambiguator::new(extraction);

        let segmentation = segment(&lines, &markers);
        debug!("found {} item blocks", segmentation.blocks.len());

        let mut warnings = Vec::new();
        let rows: Vec<LineItem> = segmentation
            .blocks
            .iter()
            .map(|block| {
                self.build_row(block, &lines, &lexer, &names, &disambiguator, &mut warnings)
            })
            .collect();

        let printed = SummaryExtractor::new(&markers, &lexer, extraction.summary_fallback_lines)
            .extract(&lines);
        if printed.is_empty() {
            warnings.push("Summary section not found".to_string());
        }

        let summary = ConsistencyChecker::new(extraction.match_tolerance, &format.match_mark)
            .check(printed, &rows);
        if !summary.taxable_base.is_empty() && !summary.is_match() {
            warnings.push(format!(
                "Taxable base ({}) differs from line item sum ({})",
                summary.taxable_base, summary.computed_base_text
            ));
        }

        debug!(
            "Extracted {} rows, {} warnings",
            rows.len(),
            warnings.len()
        );

        Extraction {
            rows,
            summary,
            period: segmentation.period,
            warnings,
        }
    }

    fn build_row(
        &self,
        block: &Block,
        lines: &[String],
        lexer: &NumberTokenExtractor,
        names: &NameAssembler,
        disambiguator: &Disambiguator,
        warnings: &mut Vec<String>,
    ) -> LineItem {
        let block_lines = &lines[block.start..block.end];

        let tokens = BlockTokens::new(
            block_lines
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    let mut tokens = lexer.extract_all(line);
                    if i == 0 {
                        for token in tokens.iter_mut() {
                            token.is_item_code = token.offset == block.code_start;
                        }
                    }
                    tokens
                })
                .collect(),
        );

        let tail = &block_lines[0][block.tail_start..];
        let name = names.assemble(tail, &block_lines[1..]);
        let classification = disambiguator.classify(&tokens);

        if classification.has_computed_amount() {
            warnings.push(format!(
                "Item {}: amount computed from quantity and unit price",
                block.code
            ));
        }

        debug!(
            "item {} {:?} unit={:?} via {}",
            block.code, name.name, name.unit, classification.rule
        );

        LineItem {
            vendor: block.vendor.clone(),
            code: block.code.clone(),
            name: name.name,
            spec: String::new(),
            unit: name.unit,
            quantity: classification.quantity.map(Field::into_text).unwrap_or_default(),
            unit_price: classification.unit_price.map(Field::into_text).unwrap_or_default(),
            amount: classification.amount.map(Field::into_text).unwrap_or_default(),
            note: String::new(),
        }
    }
}

impl LedgerExtractor for LedgerParser {
    fn extract(&self, text: &str) -> Extraction {
        self.parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const LEDGER: &str = "納品書\n\
        令和6年10月分\n\
        山田商店\n\
        0001 苺タルト EA\n\
        0.10\n\
        0.10 19,500.00\n\
        1,950.00\n\
        0002 国産大豆使用\n\
        無調整豆乳\n\
        CS 12.00 300.00 3,600.00\n\
        0003\n\
        苺タルト\n\
        EA\n\
        1 964,032.00\n\
        964,032.00\n\
        以下余白\n\
        課税対象額\n\
        969,582.00\n\
        \\1,047,148-\n\
        77,566\n";

    fn row<'a>(result: &'a Extraction, code: &str) -> &'a LineItem {
        result.rows.iter().find(|r| r.code == code).unwrap()
    }

    #[test]
    fn test_parse_ledger() {
        let result = LedgerParser::new().parse(LEDGER);

        let codes: Vec<&str> = result.rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["0001", "0002", "0003"]);

        let first = row(&result, "0001");
        assert_eq!(first.vendor, "山田商店");
        assert_eq!(first.name, "苺タルト");
        assert_eq!(first.unit, "EA");
        assert_eq!(first.quantity, "0.10");
        assert_eq!(first.unit_price, "19,500.00");
        assert_eq!(first.amount, "1,950.00");
        assert_eq!(first.spec, "");
        assert_eq!(first.note, "");

        let second = row(&result, "0002");
        assert_eq!(second.name, "国産大豆使用無調整豆乳");
        assert_eq!(second.unit, "CS");
        assert_eq!(second.quantity, "12.00");
        assert_eq!(second.unit_price, "300.00");
        assert_eq!(second.amount, "3,600.00");

        let third = row(&result, "0003");
        assert_eq!(third.name, "苺タルト");
        assert_eq!(third.unit, "EA");
        assert_eq!(third.amount, "964,032.00");

        assert_eq!(result.summary.taxable_base, "969,582.00");
        assert_eq!(result.summary.total, "1,047,148");
        assert_eq!(result.summary.tax, "77,566");
        assert_eq!(result.summary.computed_base_text, "969,582.00");
        assert_eq!(
            result.summary.computed_base_value,
            Decimal::from_str("969582.00").unwrap()
        );
        assert_eq!(result.summary.match_mark, "○");
        assert_eq!(result.period, NaiveDate::from_ymd_opt(2024, 10, 1));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_parse_empty_input() {
        for text in ["", "   \n\t\n"] {
            let result = LedgerParser::new().parse(text);
            assert!(result.rows.is_empty());
            assert_eq!(result.summary, Default::default());
        }
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = LedgerParser::new();
        assert_eq!(parser.parse(LEDGER), parser.parse(LEDGER));
    }

    #[test]
    fn test_mismatch_is_reported() {
        let text = LEDGER.replace("969,582.00\n\\", "969,000.00\n\\");
        let result = LedgerParser::new().parse(&text);
        assert_eq!(result.summary.taxable_base, "969,000.00");
        assert_eq!(result.summary.match_mark, "");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_computed_amount_is_reported() {
        let text = "0001 苺タルト EA\n3 250.00\n以下余白\n750\n825\n75\n";
        let result = LedgerParser::new()
            .with_two_token_policy(TwoTokenPolicy::ComputedAmount)
            .parse(text);

        assert_eq!(result.rows[0].amount, "750.00");
        assert_eq!(result.summary.match_mark, "○");
        assert_eq!(
            result.warnings,
            vec!["Item 0001: amount computed from quantity and unit price".to_string()]
        );
    }

    #[test]
    fn test_trailing_summary_is_not_items() {
        let text = "0001 苺タルト EA\n0.10 19,500.00\n1,950.00\n以下余白\n1950\n2106\n156\n";
        let result = LedgerParser::new().parse(text);

        let codes: Vec<&str> = result.rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["0001"]);
        assert_eq!(result.summary.taxable_base, "1950");
        assert_eq!(result.summary.total, "2106");
        assert_eq!(result.summary.tax, "156");
        assert_eq!(result.summary.computed_base_text, "1,950.00");
        assert_eq!(result.summary.match_mark, "○");
    }

    #[test]
    fn test_labeled_excluded_total() {
        let text = "0001 苺タルト EA\n0.10 19,500.00\n1,950.00\n以下余白\n\
                    税抜合計 1,950.00\n税込合計 2,106\n消費税 156\n";
        let result = LedgerParser::new().parse(text);

        assert_eq!(result.summary.taxable_base, "1,950.00");
        assert_eq!(result.summary.total, "2,106");
        assert_eq!(result.summary.tax, "156");
        assert!(result.summary.is_match());
    }

    #[test]
    fn test_item_code_is_not_a_value() {
        let text = "0012 苺タルト EA\n以下余白\n";
        let result = LedgerParser::new().parse(text);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].quantity, "");
        assert_eq!(result.rows[0].amount, "");
    }

    #[test]
    fn test_crlf_and_full_width_spaces() {
        let text = "0001\u{3000}苺タルト\u{3000}EA\r\n0.10 19,500.00\r\n1,950.00\r\n";
        let result = LedgerParser::new().parse(text);
        assert_eq!(result.rows[0].name, "苺タルト");
        assert_eq!(result.rows[0].amount, "1,950.00");
    }
}
