//! Quantity / unit price / amount classification.
//!
//! Each [`QuantityRule`] inspects the numeric tokens of one block and either
//! produces a complete classification or declines. The [`Disambiguator`] tries
//! the rules in priority order and keeps the first answer.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::config::{ExtractionConfig, TwoTokenPolicy};
use crate::models::ledger::Field;

use super::tokens::NumberToken;

/// Numeric tokens of one block, grouped by line, item code removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockTokens {
    pub lines: Vec<Vec<NumberToken>>,
}

impl BlockTokens {
    /// Build from per-line lexer output, dropping item-code tokens.
    pub fn new(lines: Vec<Vec<NumberToken>>) -> Self {
        let lines = lines
            .into_iter()
            .map(|tokens| tokens.into_iter().filter(|t| !t.is_item_code).collect())
            .collect();
        Self { lines }
    }

    /// All tokens in reading order.
    pub fn all(&self) -> Vec<&NumberToken> {
        self.lines.iter().flatten().collect()
    }

    pub fn count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }
}

/// Outcome of classifying one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub quantity: Option<Field>,
    pub unit_price: Option<Field>,
    pub amount: Option<Field>,
    /// Name of the rule that produced this result.
    pub rule: &'static str,
}

impl Classification {
    fn printed(token: &NumberToken) -> Option<Field> {
        Some(Field::Printed(token.text.clone()))
    }

    pub fn has_computed_amount(&self) -> bool {
        self.amount.as_ref().is_some_and(Field::is_computed)
    }
}

/// A single classification strategy.
pub trait QuantityRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Classify the block, or return `None` when the rule does not apply.
    fn classify(&self, block: &BlockTokens) -> Option<Classification>;
}

/// The bottom-most line with two or more numbers holds quantity and price;
/// the next line holding a number carries the amount.
pub struct LastPairRule;

impl QuantityRule for LastPairRule {
    fn name(&self) -> &'static str {
        "last-pair"
    }

    fn classify(&self, block: &BlockTokens) -> Option<Classification> {
        let pair_index = block.lines.iter().rposition(|tokens| tokens.len() >= 2)?;
        let pair = &block.lines[pair_index];
        let amount = block.lines[pair_index + 1..]
            .iter()
            .find_map(|tokens| tokens.last())?;

        Some(Classification {
            quantity: Classification::printed(&pair[pair.len() - 2]),
            unit_price: Classification::printed(&pair[pair.len() - 1]),
            amount: Classification::printed(amount),
            rule: self.name(),
        })
    }
}

/// Treat the largest number as the amount and search every ordered pair of
/// the others for the product closest to it.
pub struct BestFitRule {
    tolerance: Decimal,
}

impl BestFitRule {
    pub fn new(tolerance: Decimal) -> Self {
        Self { tolerance }
    }
}

impl QuantityRule for BestFitRule {
    fn name(&self) -> &'static str {
        "best-fit"
    }

    fn classify(&self, block: &BlockTokens) -> Option<Classification> {
        let tokens = block.all();
        if tokens.len() < 3 {
            return None;
        }

        // First maximum in reading order.
        let amount_index = tokens
            .iter()
            .enumerate()
            .fold(0, |best, (i, t)| if t.value > tokens[best].value { i } else { best });
        let amount = tokens[amount_index];
        let rest: Vec<&NumberToken> = tokens
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != amount_index)
            .map(|(_, t)| *t)
            .collect();

        let mut best: Option<(Decimal, usize, usize)> = None;
        for (i, quantity) in rest.iter().enumerate() {
            for (j, price) in rest.iter().enumerate() {
                if i == j {
                    continue;
                }
                let Some(product) = quantity.value.checked_mul(price.value) else {
                    continue;
                };
                let diff = (product - amount.value).abs();
                if best.is_none_or(|(best_diff, _, _)| diff < best_diff) {
                    best = Some((diff, i, j));
                }
            }
        }

        if let Some((diff, i, j)) = best {
            if diff < self.tolerance {
                return Some(Classification {
                    quantity: Classification::printed(rest[i]),
                    unit_price: Classification::printed(rest[j]),
                    amount: Classification::printed(amount),
                    rule: self.name(),
                });
            }
        }

        // No printed amount fits: the two smallest become quantity and price
        // and the amount is derived from them.
        let mut smallest: Vec<(usize, &NumberToken)> = rest.iter().copied().enumerate().collect();
        smallest.sort_by(|a, b| a.1.value.cmp(&b.1.value));
        smallest.truncate(2);
        smallest.sort_by_key(|(i, _)| *i);

        let quantity = smallest[0].1;
        let price = smallest[1].1;
        Some(Classification {
            quantity: Classification::printed(quantity),
            unit_price: Classification::printed(price),
            amount: quantity.value.checked_mul(price.value).map(Field::Computed),
            rule: "best-fit-computed",
        })
    }
}

/// Exactly two numbers; interpretation depends on [`TwoTokenPolicy`].
pub struct TwoTokenRule {
    policy: TwoTokenPolicy,
}

impl TwoTokenRule {
    pub fn new(policy: TwoTokenPolicy) -> Self {
        Self { policy }
    }
}

impl QuantityRule for TwoTokenRule {
    fn name(&self) -> &'static str {
        match self.policy {
            TwoTokenPolicy::AmountOnly => "two-token-amount",
            TwoTokenPolicy::ComputedAmount => "two-token-computed",
        }
    }

    fn classify(&self, block: &BlockTokens) -> Option<Classification> {
        let tokens = block.all();
        let [first, second] = tokens.as_slice() else {
            return None;
        };
        let (smaller, larger) = if second.value < first.value {
            (*second, *first)
        } else {
            (*first, *second)
        };

        let classification = match self.policy {
            TwoTokenPolicy::AmountOnly => Classification {
                quantity: Classification::printed(smaller),
                unit_price: None,
                amount: Classification::printed(larger),
                rule: self.name(),
            },
            TwoTokenPolicy::ComputedAmount => Classification {
                quantity: Classification::printed(smaller),
                unit_price: Classification::printed(larger),
                amount: smaller.value.checked_mul(larger.value).map(Field::Computed),
                rule: self.name(),
            },
        };
        Some(classification)
    }
}

/// A lone number is the quantity.
pub struct SingleTokenRule;

impl QuantityRule for SingleTokenRule {
    fn name(&self) -> &'static str {
        "single-token"
    }

    fn classify(&self, block: &BlockTokens) -> Option<Classification> {
        let tokens = block.all();
        let [only] = tokens.as_slice() else {
            return None;
        };
        Some(Classification {
            quantity: Classification::printed(only),
            rule: self.name(),
            ..Default::default()
        })
    }
}

/// Runs the rules in priority order.
pub struct Disambiguator {
    rules: Vec<Box<dyn QuantityRule>>,
}

impl Disambiguator {
    /// The standard rule chain.
    pub fn new(config: &ExtractionConfig) -> Self {
        let rules: Vec<Box<dyn QuantityRule>> = vec![
            Box::new(LastPairRule),
            Box::new(BestFitRule::new(config.pair_tolerance)),
            Box::new(TwoTokenRule::new(config.two_token_policy)),
            Box::new(SingleTokenRule),
        ];
        Self::with_rules(rules)
    }

    /// A custom rule chain, tried in the given order.
    pub fn with_rules(rules: Vec<Box<dyn QuantityRule>>) -> Self {
        Self { rules }
    }

    /// Classify a block; blocks no rule accepts get blank fields.
    pub fn classify(&self, block: &BlockTokens) -> Classification {
        self.rules
            .iter()
            .find_map(|rule| rule.classify(block))
            .inspect(|c| debug!("classified {} tokens with {}", block.count(), c.rule))
            .unwrap_or_else(|| Classification {
                rule: "blank",
                ..Default::default()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::rules::tokens::NumberTokenExtractor;
    use crate::ledger::rules::FieldExtractor;
    use pretty_assertions::assert_eq;

    fn block(lines: &[&str]) -> BlockTokens {
        let lexer = NumberTokenExtractor::new(&['¥', '￥', '\\']);
        BlockTokens::new(lines.iter().map(|l| lexer.extract_all(l)).collect())
    }

    fn texts(c: &Classification) -> (String, String, String) {
        let text = |f: &Option<Field>| f.clone().map(Field::into_text).unwrap_or_default();
        (text(&c.quantity), text(&c.unit_price), text(&c.amount))
    }

    fn triple(q: &str, p: &str, a: &str) -> (String, String, String) {
        (q.to_string(), p.to_string(), a.to_string())
    }

    #[test]
    fn test_last_pair_rule() {
        let tokens = block(&["0.10", "0.10 19,500.00", "1,950.00"]);
        let result = Disambiguator::new(&ExtractionConfig::default()).classify(&tokens);
        assert_eq!(result.rule, "last-pair");
        assert_eq!(texts(&result), triple("0.10", "19,500.00", "1,950.00"));
    }

    #[test]
    fn test_last_pair_uses_bottom_most_pair_line() {
        let tokens = block(&["1 100", "", "2 150.00", "苺", "300.00"]);
        let result = LastPairRule.classify(&tokens).unwrap();
        assert_eq!(texts(&result), triple("2", "150.00", "300.00"));
    }

    #[test]
    fn test_last_pair_needs_amount_line() {
        let tokens = block(&["10 300.00 3,000.00"]);
        assert_eq!(LastPairRule.classify(&tokens), None);
    }

    #[test]
    fn test_best_fit_exact_product() {
        let tokens = block(&["12.00", "300.00", "3600.00"]);
        let result = Disambiguator::new(&ExtractionConfig::default()).classify(&tokens);
        assert_eq!(result.rule, "best-fit");
        assert_eq!(texts(&result), triple("12.00", "300.00", "3600.00"));
    }

    #[test]
    fn test_best_fit_on_single_line() {
        let tokens = block(&["10 300.00 3,000.00"]);
        let result = Disambiguator::new(&ExtractionConfig::default()).classify(&tokens);
        assert_eq!(texts(&result), triple("10", "300.00", "3,000.00"));
        assert!(!result.has_computed_amount());
    }

    #[test]
    fn test_best_fit_within_tolerance() {
        let tokens = block(&["3", "33.33", "100"]);
        let result = BestFitRule::new(Decimal::new(5, 1)).classify(&tokens).unwrap();
        assert_eq!(texts(&result), triple("3", "33.33", "100"));
    }

    #[test]
    fn test_best_fit_computed_fallback() {
        let tokens = block(&["5", "2", "7", "1,000"]);
        let result = Disambiguator::new(&ExtractionConfig::default()).classify(&tokens);
        assert_eq!(result.rule, "best-fit-computed");
        assert!(result.has_computed_amount());
        assert_eq!(texts(&result), triple("5", "2", "10.00"));
    }

    #[test]
    fn test_two_tokens_amount_only() {
        let tokens = block(&["3,000", "10"]);
        let result = Disambiguator::new(&ExtractionConfig::default()).classify(&tokens);
        assert_eq!(result.rule, "two-token-amount");
        assert_eq!(texts(&result), triple("10", "", "3,000"));
    }

    #[test]
    fn test_two_tokens_computed_amount() {
        let config = ExtractionConfig {
            two_token_policy: TwoTokenPolicy::ComputedAmount,
            ..Default::default()
        };
        let tokens = block(&["3", "250.00"]);
        let result = Disambiguator::new(&config).classify(&tokens);
        assert_eq!(result.rule, "two-token-computed");
        assert_eq!(texts(&result), triple("3", "250.00", "750.00"));
        assert!(result.has_computed_amount());
    }

    #[test]
    fn test_two_tokens_on_one_line_without_amount_line() {
        let tokens = block(&["10 300.00"]);
        let result = Disambiguator::new(&ExtractionConfig::default()).classify(&tokens);
        assert_eq!(texts(&result), triple("10", "", "300.00"));
    }

    #[test]
    fn test_single_and_empty() {
        let disambiguator = Disambiguator::new(&ExtractionConfig::default());

        let result = disambiguator.classify(&block(&["苺タルト", "12"]));
        assert_eq!(texts(&result), triple("12", "", ""));

        let result = disambiguator.classify(&block(&["苺タルト"]));
        assert_eq!(result.rule, "blank");
        assert_eq!(texts(&result), triple("", "", ""));
    }

    #[test]
    fn test_item_code_tokens_are_ignored() {
        let lexer = NumberTokenExtractor::new(&['\\']);
        let mut code_line = lexer.extract_all("0001 苺タルト 12");
        code_line[0].is_item_code = true;
        let tokens = BlockTokens::new(vec![code_line]);
        assert_eq!(tokens.count(), 1);
        assert_eq!(tokens.all()[0].text, "12");
    }

    #[test]
    fn test_custom_chain_order() {
        let rules: Vec<Box<dyn QuantityRule>> = vec![Box::new(SingleTokenRule)];
        let disambiguator = Disambiguator::with_rules(rules);
        let result = disambiguator.classify(&block(&["1 2", "3"]));
        assert_eq!(result.rule, "blank");
    }
}
