//! Text normalization applied before segmentation.

/// Split text into normalized lines.
///
/// Line endings are unified, ideographic/no-break spaces and tabs become
/// ASCII spaces, and trailing whitespace is trimmed. Full-width digits are
/// left alone so product names such as `１Ｌ豆乳飲料` never read as numbers.
pub fn normalize_text(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(|line| {
            line.chars()
                .map(|c| match c {
                    '\u{3000}' | '\u{00a0}' | '\t' => ' ',
                    other => other,
                })
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

/// Remove all whitespace, for matching letter-spaced headers.
pub fn compact(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Fold full-width digits to ASCII.
pub fn half_width_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            other => other,
        })
        .collect()
}
