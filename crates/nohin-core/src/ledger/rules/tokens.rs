//! Number-token lexer and ledger-style amount helpers.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::FieldExtractor;

/// A numeric-looking substring of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberToken {
    /// Text exactly as printed.
    pub text: String,
    /// Parsed value with decorations removed.
    pub value: Decimal,
    /// Byte offset of the token within its line.
    pub offset: usize,
    /// Whether this token is the item code anchoring the block.
    pub is_item_code: bool,
}

impl NumberToken {
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// Scans a line for numeric tokens.
///
/// A token is a maximal run of ASCII digits, `,`, `.` and currency glyphs,
/// optionally followed by a run of hyphens (the ledger's sign marker).
/// Full-width digits never start or extend a token.
pub struct NumberTokenExtractor<'a> {
    currency_glyphs: &'a [char],
}

impl<'a> NumberTokenExtractor<'a> {
    pub fn new(currency_glyphs: &'a [char]) -> Self {
        Self { currency_glyphs }
    }

    fn is_token_char(&self, c: char) -> bool {
        c.is_ascii_digit() || c == ',' || c == '.' || self.currency_glyphs.contains(&c)
    }
}

impl FieldExtractor for NumberTokenExtractor<'_> {
    type Output = NumberToken;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut tokens = Vec::new();
        let mut chars = text.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            // Separators never open a token.
            if !self.is_token_char(c) || c == ',' {
                continue;
            }

            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if !self.is_token_char(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            while let Some(&(i, '-')) = chars.peek() {
                end = i + 1;
                chars.next();
            }

            let raw = &text[start..end];
            if let Some(value) = parse_ledger_amount(raw) {
                tokens.push(NumberToken {
                    text: raw.to_string(),
                    value,
                    offset: start,
                    is_item_code: false,
                });
            }
        }

        tokens
    }
}

/// Parse a ledger-formatted number (e.g. `\1,047,148-`, `19,500.00`).
///
/// Everything except ASCII digits and the decimal point is treated as
/// decoration and dropped; the sign marker never makes a value negative.
pub fn parse_ledger_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Strip currency glyphs and the trailing sign marker, keeping separators.
pub fn strip_decorations(s: &str, currency_glyphs: &[char]) -> String {
    s.trim()
        .trim_end_matches('-')
        .chars()
        .filter(|c| !currency_glyphs.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Format a value in ledger style (1,234.56).
pub fn format_ledger_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.round_dp(2));
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let (integer_part, decimal_part) = digits.split_once('.').unwrap_or((digits, "00"));

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    format!("{}{}.{}", sign, formatted, decimal_part)
}
