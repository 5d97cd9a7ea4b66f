//! Partitioning of ledger lines into item blocks.

use chrono::NaiveDate;
use tracing::trace;

use super::markers::{LineKind, Markers};

/// Line range belonging to one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Item code anchoring the block.
    pub code: String,
    /// Vendor in effect when the block starts.
    pub vendor: String,
    /// Index of the code line.
    pub start: usize,
    /// Exclusive end index.
    pub end: usize,
    /// Byte offset of the code on the code line.
    pub code_start: usize,
    /// Byte offset where the text after the code begins.
    pub tail_start: usize,
}

/// Output of [`segment`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    pub blocks: Vec<Block>,
    /// Month of the first era header, if any.
    pub period: Option<NaiveDate>,
}

/// Split normalized lines into item blocks.
pub fn segment<S: AsRef<str>>(lines: &[S], markers: &Markers) -> Segmentation {
    let kinds = classify_lines(lines, markers);

    let period = kinds.iter().find_map(|kind| match kind {
        LineKind::EraHeader(date) => Some(*date),
        _ => None,
    });

    // Lines after the last remainder-blank marker are the summary section.
    let items_end = kinds
        .iter()
        .rposition(|kind| *kind == LineKind::RemainderBlank)
        .map_or(kinds.len(), |marker| marker + 1);

    // The current vendor is the only state carried from block to block.
    let (_, blocks) = kinds[..items_end].iter().enumerate().fold(
        (String::new(), Vec::new()),
        |(vendor, mut blocks), (index, kind)| match kind {
            LineKind::Vendor(name) => (name.clone(), blocks),
            LineKind::ItemCode {
                code,
                code_start,
                tail_start,
            } => {
                let end = block_end(&kinds, index);
                trace!("block {} spans lines {}..{}", code, index, end);
                blocks.push(Block {
                    code: code.clone(),
                    vendor: vendor.clone(),
                    start: index,
                    end,
                    code_start: *code_start,
                    tail_start: *tail_start,
                });
                (vendor, blocks)
            }
            _ => (vendor, blocks),
        },
    );

    Segmentation { blocks, period }
}

/// Classify every line, turning the first non-blank line after an era
/// header into a vendor line.
fn classify_lines<S: AsRef<str>>(lines: &[S], markers: &Markers) -> Vec<LineKind> {
    let mut kinds = Vec::with_capacity(lines.len());
    let mut awaiting_vendor = false;

    for line in lines {
        let line = line.as_ref();
        let kind = match markers.classify(line) {
            LineKind::Blank => LineKind::Blank,
            _ if awaiting_vendor => {
                awaiting_vendor = false;
                LineKind::Vendor(line.trim().to_string())
            }
            kind @ LineKind::EraHeader(_) => {
                awaiting_vendor = true;
                kind
            }
            kind => kind,
        };
        kinds.push(kind);
    }

    kinds
}

/// Find the exclusive end of the block whose code line is at `start`.
fn block_end(kinds: &[LineKind], start: usize) -> usize {
    for (index, kind) in kinds.iter().enumerate().skip(start + 1) {
        match kind {
            LineKind::ItemCode { .. }
            | LineKind::EraHeader(_)
            | LineKind::Vendor(_)
            | LineKind::Title
            | LineKind::TaxableBase => return index,
            LineKind::RemainderBlank => return index + 1,
            LineKind::Blank | LineKind::Text => {}
        }
    }
    kinds.len()
}
