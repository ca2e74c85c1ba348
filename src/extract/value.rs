//! Text normalization and typed value parsing for extracted fields.

use super::{ExtractError, Field};

/// Currency glyphs stripped from the front of a price.
const CURRENCY_GLYPHS: [char; 2] = ['¥', '￥'];

/// Trims leading and trailing whitespace, non-breaking spaces included.
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{a0}')
        .to_string()
}

/// Parses a price such as `¥39.80` into minor units (3980).
///
/// The fractional part beyond two digits is truncated. Empty text is 0.
/// The decimal is parsed digit by digit, so `39.80` is exactly 3980.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedNumber`] when the text is present but is
/// not an unsigned decimal.
pub fn parse_price(text: &str) -> Result<i64, ExtractError> {
    let digits = normalize_text(text.trim_start_matches(CURRENCY_GLYPHS));
    if digits.is_empty() {
        return Ok(0);
    }

    let malformed = || ExtractError::malformed_number(Field::Price, text, "a decimal amount");
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(malformed());
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| malformed())?
    };
    let cents = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(2)
        .fold(0_i64, |acc, digit| acc * 10 + i64::from(digit - b'0'));

    whole
        .checked_mul(100)
        .and_then(|value| value.checked_add(cents))
        .ok_or_else(malformed)
}

/// Parses a page or word count. Empty text is 0.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedNumber`] when the text is present but is
/// not a base-10 integer.
pub fn parse_count(field: Field, text: &str) -> Result<i64, ExtractError> {
    let text = normalize_text(text);
    if text.is_empty() {
        return Ok(0);
    }
    text.parse()
        .map_err(|_| ExtractError::malformed_number(field, &text, "a base-10 integer"))
}

/// Splits a comma-joined tag line. Individual tags are not trimmed.
#[must_use]
pub fn split_tags(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(',').map(str::to_string).collect()
}
