//! Tolerant parsing of numeric and percentage text fields.
//!
//! Slot spreadsheets are curated by hand, so every field is treated as
//! best-effort: whatever numeric prefix can be found is used and anything
//! else degrades to zero. None of these functions fail.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// First integer-like token, optionally negative, with comma grouping.
static INTEGER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d{1,3}(?:[,\d]{0,15})?").expect("valid integer pattern"));

/// First signed decimal token once grouping characters are gone.
static DECIMAL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid decimal pattern"));

/// How commas in percentage fields are interpreted.
///
/// | Variant | `"1,234.5"` | `"3,2"` |
/// |---------|-------------|---------|
/// | `Point` | 1234.5      | 32.0    |
/// | `Comma` | 1.2345      | 3.2     |
///
/// With `Comma`, dots are thousand separators and are removed before the
/// comma is turned into a decimal point, so `"1.234,5"` reads as 1234.5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecimalSeparator {
    #[default]
    Point,
    Comma,
}

/// Parses a departure count, returning 0 for absent or malformed input.
///
/// A numeric prefix is enough: `"12abc"` yields 12 and `"1,234 flights"`
/// yields 1234. Fractions are truncated (`"7.9"` yields 7).
pub fn parse_number(raw: Option<&str>) -> i64 {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };

    let Some(m) = INTEGER_TOKEN.find(s) else {
        return 0;
    };

    let digits: String = m.as_str().chars().filter(|c| *c != ',').collect();
    digits
        .parse::<i64>()
        .or_else(|_| digits.parse::<f64>().map(|f| f as i64))
        .unwrap_or(0)
}

/// Parses a market-share percentage using the default [`DecimalSeparator::Point`].
pub fn parse_percent(raw: Option<&str>) -> f64 {
    parse_percent_with(raw, DecimalSeparator::Point)
}

/// Parses a market-share percentage such as `"45.5%"`, returning 0.0 for
/// absent or malformed input.
pub fn parse_percent_with(raw: Option<&str>, separator: DecimalSeparator) -> f64 {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0.0;
    };

    let s = s.replace('%', "");
    let s = match separator {
        DecimalSeparator::Point => s.replace(',', ""),
        DecimalSeparator::Comma => s.replace('.', "").replace(',', "."),
    };

    DECIMAL_TOKEN
        .find(&s)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}
