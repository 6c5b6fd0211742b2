//! # Fraction Codec
//!
//! Converts between the imperial fraction strings people type at the bin
//! counter ("1-1/2", "3/8", "2") and decimal values, and back again for
//! display.
//!
//! ## Grammar
//!
//! ```text
//! whole     = DIGITS                      "2"
//! fraction  = DIGITS "/" DIGITS           "3/8"
//! mixed     = DIGITS "-" DIGITS "/" DIGITS  "1-1/2"
//! decimal   = DIGITS "." DIGITS           "0.5"
//! ```
//!
//! Leading and trailing whitespace is ignored. Zero denominators and signs are
//! rejected.
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::fraction::{self, Fraction};
//!
//! let length = fraction::parse("1-1/2").unwrap();
//! assert_eq!(length.value(), 1.5);
//! assert_eq!(fraction::format(length).text(), "1-1/2");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{LayoutError, LayoutResult};

/// Two fractions closer than this are the same size.
pub const TOLERANCE: f64 = 1e-3;

/// Largest denominator tried when formatting (sixteenths).
pub const DEFAULT_MAX_DENOMINATOR: u32 = 16;

/// Largest denominator tried by [`to_lossless_string`] before falling back
/// to a full-precision decimal.
pub const LOSSLESS_MAX_DENOMINATOR: u32 = 128;

/// A non-negative size in inches.
///
/// Ordering and equality are exact (`f64::total_cmp`); use
/// [`Fraction::approx_eq`] to compare sizes that came from user input.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Fraction(f64);

impl Fraction {
    /// Wrap a decimal value. Fails for negative, NaN or infinite values.
    pub fn new(value: f64) -> LayoutResult<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(LayoutError::parse(value.to_string(), "Value must be a non-negative number"));
        }
        Ok(Fraction(value))
    }

    /// Build `whole + numerator/denominator`.
    pub fn from_parts(whole: u64, numerator: u64, denominator: u64) -> LayoutResult<Self> {
        if denominator == 0 {
            return Err(LayoutError::parse(
                format!("{}-{}/{}", whole, numerator, denominator),
                "Denominator must be greater than zero",
            ));
        }
        Ok(Fraction(whole as f64 + numerator as f64 / denominator as f64))
    }

    /// Decimal value in inches
    pub fn value(self) -> f64 {
        self.0
    }

    /// True when both sizes are within [`TOLERANCE`] of each other.
    pub fn approx_eq(self, other: Fraction) -> bool {
        (self.0 - other.0).abs() < TOLERANCE
    }

    pub fn is_zero(self) -> bool {
        self.0 < TOLERANCE
    }
}

impl TryFrom<f64> for Fraction {
    type Error = LayoutError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Fraction::new(value)
    }
}

impl From<Fraction> for f64 {
    fn from(value: Fraction) -> f64 {
        value.0
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(format(*self).text())
    }
}

impl FromStr for Fraction {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Result of formatting a value back into text.
///
/// `Approximate` means no denominator in the search range matched and the
/// text is a rounded decimal; parsing it back may give a slightly different
/// size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum FormattedFraction {
    Exact(String),
    Approximate(String),
}

impl FormattedFraction {
    pub fn text(&self) -> &str {
        match self {
            FormattedFraction::Exact(text) | FormattedFraction::Approximate(text) => text,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, FormattedFraction::Exact(_))
    }

    pub fn into_string(self) -> String {
        match self {
            FormattedFraction::Exact(text) | FormattedFraction::Approximate(text) => text,
        }
    }
}

/// Parse a whole, fractional, mixed or decimal number.
///
/// # Example
///
/// ```rust
/// use bolt_core::fraction::parse;
///
/// assert_eq!(parse("3/8").unwrap().value(), 0.375);
/// assert_eq!(parse(" 2 ").unwrap().value(), 2.0);
/// assert!(parse("1/0").is_err());
/// assert!(parse("-1/2").is_err());
/// ```
pub fn parse(text: &str) -> LayoutResult<Fraction> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(LayoutError::parse(text, "Empty value"));
    }

    if let Some((whole, rest)) = trimmed.split_once('-') {
        let whole = parse_digits(text, whole)?;
        let (numerator, denominator) = rest
            .split_once('/')
            .ok_or_else(|| LayoutError::parse(text, "Mixed number needs a fraction part, e.g. 1-1/2"))?;
        return ratio(text, whole, numerator, denominator);
    }

    if let Some((numerator, denominator)) = trimmed.split_once('/') {
        return ratio(text, 0, numerator, denominator);
    }

    if let Some((int_part, dec_part)) = trimmed.split_once('.') {
        check_digits(text, int_part)?;
        check_digits(text, dec_part)?;
        let value: f64 = trimmed
            .parse()
            .map_err(|_| LayoutError::parse(text, "Not a decimal number"))?;
        return Fraction::new(value);
    }

    Ok(Fraction(parse_digits(text, trimmed)? as f64))
}

fn ratio(text: &str, whole: u64, numerator: &str, denominator: &str) -> LayoutResult<Fraction> {
    let numerator = parse_digits(text, numerator)?;
    let denominator = parse_digits(text, denominator)?;
    if denominator == 0 {
        return Err(LayoutError::parse(text, "Denominator must be greater than zero"));
    }
    Fraction::from_parts(whole, numerator, denominator)
}

fn check_digits(text: &str, segment: &str) -> LayoutResult<()> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LayoutError::parse(
            text,
            format!("'{}' is not a non-negative integer", segment),
        ));
    }
    Ok(())
}

fn parse_digits(text: &str, segment: &str) -> LayoutResult<u64> {
    check_digits(text, segment)?;
    segment
        .parse()
        .map_err(|_| LayoutError::parse(text, format!("'{}' is too large", segment)))
}

/// Format with denominators up to [`DEFAULT_MAX_DENOMINATOR`].
pub fn format(value: Fraction) -> FormattedFraction {
    format_with_bound(value, DEFAULT_MAX_DENOMINATOR)
}

/// Format `value` as the simplest fraction with denominator `<= max_denominator`.
///
/// Denominators are tried in ascending order, so the first match is already
/// reduced (0.5 is "1/2", never "2/4").
///
/// # Example
///
/// ```rust
/// use bolt_core::fraction::{format_with_bound, parse, FormattedFraction};
///
/// let three_sixteenths = parse("3/16").unwrap();
/// assert_eq!(format_with_bound(three_sixteenths, 16), FormattedFraction::Exact("3/16".into()));
/// assert_eq!(format_with_bound(three_sixteenths, 8), FormattedFraction::Approximate("0.19".into()));
/// ```
pub fn format_with_bound(value: Fraction, max_denominator: u32) -> FormattedFraction {
    let v = value.value();
    if (v - v.round()).abs() < TOLERANCE {
        return FormattedFraction::Exact(format!("{}", v.round() as u64));
    }

    let whole = v.floor();
    let remainder = v - whole;
    for denominator in 2..=max_denominator {
        let scaled = remainder * f64::from(denominator);
        let numerator = scaled.round();
        if (scaled - numerator).abs() < TOLERANCE {
            let numerator = numerator as u64;
            return FormattedFraction::Exact(if whole == 0.0 {
                format!("{}/{}", numerator, denominator)
            } else {
                format!("{}-{}/{}", whole as u64, numerator, denominator)
            });
        }
    }

    FormattedFraction::Approximate(format!("{:.2}", v))
}

/// Text that parses back to `value` within [`TOLERANCE`], for saving.
///
/// Tries `max_denominator` first so saved files read like the screen, then
/// denominators up to [`LOSSLESS_MAX_DENOMINATOR`], then the shortest decimal
/// that round-trips exactly.
///
/// # Example
///
/// ```rust
/// use bolt_core::fraction::{parse, to_lossless_string};
///
/// let five_32nds = parse("5/32").unwrap();
/// assert_eq!(to_lossless_string(five_32nds, 16), "5/32");
/// ```
pub fn to_lossless_string(value: Fraction, max_denominator: u32) -> String {
    match format_with_bound(value, max_denominator) {
        FormattedFraction::Exact(text) => text,
        FormattedFraction::Approximate(_) => match format_with_bound(value, LOSSLESS_MAX_DENOMINATOR) {
            FormattedFraction::Exact(text) => text,
            FormattedFraction::Approximate(_) => value.value().to_string(),
        },
    }
}

/// Ordering key for rows and lengths.
pub fn sort_key(value: Fraction) -> f64 {
    value.value()
}
