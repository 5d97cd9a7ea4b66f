//! Product name and unit reconstruction.

use tracing::trace;

use super::markers::Markers;
use super::tokens::NumberTokenExtractor;
use super::FieldExtractor;

/// Name and unit of one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameAndUnit {
    pub name: String,
    pub unit: String,
}

/// Rebuilds wrapped product names and finds the unit code.
pub struct NameAssembler<'a> {
    units: Vec<&'a str>,
    markers: &'a Markers<'a>,
    lexer: &'a NumberTokenExtractor<'a>,
}

impl<'a> NameAssembler<'a> {
    pub fn new(markers: &'a Markers<'a>, lexer: &'a NumberTokenExtractor<'a>) -> Self {
        Self {
            units: markers.format().unit_codes_longest_first(),
            markers,
            lexer,
        }
    }

    /// Assemble the name from the code line's tail and the block's following
    /// lines.
    pub fn assemble<S: AsRef<str>>(&self, tail: &str, following: &[S]) -> NameAndUnit {
        let mut fragments: Vec<String> = Vec::new();

        if let Some((start, end)) = self.find_unit(tail) {
            push_fragment(&mut fragments, &tail[..start]);
            return NameAndUnit {
                name: join_fragments(&fragments),
                unit: tail[start..end].to_string(),
            };
        }
        push_fragment(&mut fragments, tail);

        let mut unit = String::new();
        for line in following {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            if self.markers.is_remainder_blank(line) {
                break;
            }

            if let Some((start, end)) = self.find_unit(line) {
                push_fragment(&mut fragments, &line[..start]);
                unit = line[start..end].to_string();
                break;
            }

            match self.lexer.extract(line) {
                Some(first) => {
                    push_fragment(&mut fragments, &line[..first.offset]);
                    break;
                }
                None => push_fragment(&mut fragments, line),
            }
        }

        let mut name = join_fragments(&fragments);
        if unit.is_empty() {
            if let Some((stripped, glued)) = self.strip_glued_unit(&name) {
                trace!("unit {} split off the end of {}", glued, name);
                name = stripped;
                unit = glued;
            }
        }

        NameAndUnit { name, unit }
    }

    /// Byte range of the first word-bounded unit code that does not follow a
    /// digit.
    fn find_unit(&self, text: &str) -> Option<(usize, usize)> {
        for (start, _) in text.char_indices() {
            let preceded_by_word = text[..start]
                .chars()
                .next_back()
                .is_some_and(is_ascii_word);
            if preceded_by_word {
                continue;
            }

            for unit in &self.units {
                if !text[start..].starts_with(unit) {
                    continue;
                }
                let end = start + unit.len();
                let followed_by_word = text[end..].chars().next().is_some_and(is_ascii_word);
                if !followed_by_word {
                    return Some((start, end));
                }
            }
        }
        None
    }

    /// Split a unit code glued to the end of the name (`苺タルト10EA`).
    fn strip_glued_unit(&self, name: &str) -> Option<(String, String)> {
        self.units.iter().find_map(|unit| {
            let stem = name.strip_suffix(unit)?;
            let before = stem.chars().next_back()?;
            if before.is_whitespace() || before.is_ascii_alphabetic() {
                return None;
            }
            Some((stem.to_string(), unit.to_string()))
        })
    }
}

fn is_ascii_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn push_fragment(fragments: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        fragments.push(text.to_string());
    }
}

/// Concatenate wrapped fragments, inserting a space only between two ASCII
/// alphanumerics.
fn join_fragments(fragments: &[String]) -> String {
    let mut name = String::new();
    for fragment in fragments {
        let needs_space = name.chars().next_back().is_some_and(|c| c.is_ascii_alphanumeric())
            && fragment.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
        if needs_space {
            name.push(' ');
        }
        name.push_str(fragment);
    }
    name
}
