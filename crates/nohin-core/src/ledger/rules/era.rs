//! Era-year-month header decoding.

use chrono::NaiveDate;

use crate::models::config::Era;

use super::normalize::half_width_digits;
use super::patterns::ERA_HEADER;
use super::FieldExtractor;

/// Finds `令和6年10月`-style headers and converts them to the first day of
/// that Gregorian month.
pub struct EraExtractor<'a> {
    eras: &'a [Era],
}

impl<'a> EraExtractor<'a> {
    pub fn new(eras: &'a [Era]) -> Self {
        Self { eras }
    }

    fn decode(&self, name: &str, year: &str, month: &str) -> Option<NaiveDate> {
        let era = self.eras.iter().find(|era| name.ends_with(era.name.as_str()))?;

        // 元年 is the first year of an era.
        let year: i32 = if year == "元" {
            1
        } else {
            half_width_digits(year).parse().ok()?
        };
        let month: u32 = half_width_digits(month).parse().ok()?;

        NaiveDate::from_ymd_opt(era.first_year + year - 1, month, 1)
    }
}

impl FieldExtractor for EraExtractor<'_> {
    type Output = NaiveDate;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        ERA_HEADER
            .captures_iter(text)
            .find_map(|caps| self.decode(&caps[1], &caps[2], &caps[3]))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        ERA_HEADER
            .captures_iter(text)
            .filter_map(|caps| self.decode(&caps[1], &caps[2], &caps[3]))
            .collect()
    }
}
