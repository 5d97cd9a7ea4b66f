//! Static line patterns of the delivery ledger layout.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Item code: four ASCII digits opening the line. A following digit,
    // separator or decimal point means the line starts with a number instead.
    pub static ref ITEM_CODE: Regex = Regex::new(
        r"^ *([0-9]{4})(?:[^0-9.,]|$)"
    ).unwrap();

    // Era-year-month vendor header, e.g. "令和6年10月分" or "平成元年４月".
    pub static ref ERA_HEADER: Regex = Regex::new(
        r"(\p{Han}+?)\s*([0-9０-９]{1,2}|元)\s*年\s*([0-9０-９]{1,2})\s*月"
    ).unwrap();
}
