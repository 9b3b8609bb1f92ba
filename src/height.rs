//! # Tide Height Parsing
//!
//! Feeds report heights as plain numbers, as strings carrying unit noise and
//! French decimal commas (`"1,50 m"`), or as the sentinel `"N/A"`. Everything is
//! reduced to metres as `Option<f64>`; `None` means the height is unknown and the
//! display shows a placeholder instead.

use crate::RawHeight;
use regex::Regex;
use std::sync::LazyLock;

/// Shown in place of a height that could not be parsed.
pub const UNKNOWN_HEIGHT: &str = "N/A";

/// Resolve a raw height to metres.
///
/// Strings are cleaned before parsing: the first comma becomes a decimal
/// point, then every character other than digits, `+`, `-` and `.` is
/// dropped. The longest leading number of what remains is used, so trailing
/// garbage after a valid value is ignored. No digits at all means unknown.
///
/// # Example
/// ```
/// use surf_tides::{height::parse_height, RawHeight};
///
/// assert_eq!(parse_height(&RawHeight::Number(1.23)), Some(1.23));
/// assert_eq!(parse_height(&RawHeight::Text("1,50 m".into())), Some(1.5));
/// assert_eq!(parse_height(&RawHeight::Text("N/A".into())), None);
/// ```
pub fn parse_height(raw: &RawHeight) -> Option<f64> {
    match raw {
        RawHeight::Number(value) if value.is_finite() => Some(*value),
        RawHeight::Number(_) => None,
        RawHeight::Text(text) => parse_height_text(text),
        RawHeight::Missing => None,
    }
}

fn parse_height_text(text: &str) -> Option<f64> {
    // Digits may sit on either side of the point, but at least one is required.
    static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)").expect("valid regex")
    });

    let cleaned: String = text
        .replacen(',', ".", 1)
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
        .collect();

    LEADING_NUMBER
        .find(&cleaned)
        .and_then(|number| number.as_str().parse().ok())
}

/// Format a height in metres with two decimals, or the placeholder.
pub fn format_height(height: Option<f64>) -> String {
    match height {
        Some(metres) => format!("{:.2}m", metres),
        None => UNKNOWN_HEIGHT.to_string(),
    }
}
