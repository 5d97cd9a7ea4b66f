//! Rule-based building blocks of the ledger parser.

pub mod era;
pub mod markers;
pub mod names;
pub mod normalize;
pub mod patterns;
pub mod quantities;
pub mod segment;
pub mod summary;
pub mod tokens;

pub use era::EraExtractor;
pub use markers::{LineKind, Markers, SummarySlot};
pub use names::{NameAndUnit, NameAssembler};
pub use normalize::{compact, half_width_digits, normalize_text};
pub use quantities::{BlockTokens, Classification, Disambiguator, QuantityRule};
pub use segment::{segment, Block, Segmentation};
pub use summary::{ConsistencyChecker, PrintedSummary, SummaryExtractor};
pub use tokens::{
    format_ledger_amount, parse_ledger_amount, strip_decorations, NumberToken,
    NumberTokenExtractor,
};

/// Trait for extractors that scan text for one kind of field.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field, in source order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
