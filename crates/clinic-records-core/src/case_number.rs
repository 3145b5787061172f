//! Case number canonicalization.
//!
//! Case numbers are typed freely at the front desk ("7", "No. 12", "00031")
//! but stored zero-padded to [`CASE_NO_WIDTH`] digits so that a plain text
//! `ORDER BY case_no` sorts them numerically. Every write goes through
//! [`encode`] and every read that reaches a user goes through [`decode`].
//!
//! Both functions are total: there is no input they reject.

use std::sync::LazyLock;

use regex::Regex;

/// Width of the canonical stored form.
pub const CASE_NO_WIDTH: usize = 5;

static PADDED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^0+[0-9]+$").unwrap());

/// Canonicalize a raw case number for storage.
///
/// All non-digit characters are dropped; the remaining digits are left-padded
/// with zeros to [`CASE_NO_WIDTH`]. Longer digit runs are kept whole. Input
/// without any digit is returned trimmed.
pub fn encode(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return raw.trim().to_string();
    }
    format!("{digits:0>width$}", width = CASE_NO_WIDTH)
}

/// Turn a stored case number back into its display form.
///
/// Only values made of leading zeros followed by digits are unpadded; an
/// all-zero value becomes `"0"`. Anything else is returned unchanged.
pub fn decode(stored: &str) -> String {
    if !PADDED.is_match(stored) {
        return stored.to_string();
    }
    let unpadded = stored.trim_start_matches('0');
    if unpadded.is_empty() {
        "0".to_string()
    } else {
        unpadded.to_string()
    }
}

/// Check whether a value is already in canonical stored form.
pub fn is_canonical(value: &str) -> bool {
    encode(value) == value
}
