use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8,15}$").expect("phone pattern compiles"));

/// 8 to 15 ASCII digits after trimming, nothing else.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(phone.trim())
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

/// Keeps only the digits of a phone number and prefixes `1` to bare
/// ten digit numbers.
pub fn clean_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 10 {
        format!("1{}", digits)
    } else {
        digits
    }
}
