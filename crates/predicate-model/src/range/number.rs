use super::{Range, bound, split_range};
use crate::error::RangeError;

fn parse_decimal(raw: &str) -> Result<f64, RangeError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RangeError::InvalidNumber(raw.to_string()))
}

fn parse_integer(raw: &str) -> Result<i64, RangeError> {
    raw.parse::<i64>()
        .map_err(|_| RangeError::InvalidNumber(raw.to_string()))
}

pub fn is_decimal(value: &str) -> bool {
    parse_decimal(value.trim()).is_ok()
}

pub fn is_integer(value: &str) -> bool {
    parse_integer(value.trim()).is_ok()
}

/// True for `a,b` where each side is a decimal or the wildcard.
pub fn is_numeric_range(value: &str) -> bool {
    parse_decimal_range(value).is_ok() && split_range(value).is_some()
}

/// Parses a single decimal or a `lower,upper` decimal range. Both bounds are
/// inclusive; a single value yields the degenerate range `[v, v]`.
pub fn parse_decimal_range(value: &str) -> Result<Range<f64>, RangeError> {
    match split_range(value) {
        Some((lower, upper)) => {
            Range::new(bound(lower, parse_decimal)?, bound(upper, parse_decimal)?)
        }
        None => {
            let v = parse_decimal(value.trim())?;
            Range::new(Some(v), Some(v))
        }
    }
}

/// Integer counterpart of [`parse_decimal_range`].
pub fn parse_integer_range(value: &str) -> Result<Range<i64>, RangeError> {
    match split_range(value) {
        Some((lower, upper)) => {
            Range::new(bound(lower, parse_integer)?, bound(upper, parse_integer)?)
        }
        None => {
            let v = parse_integer(value.trim())?;
            Range::new(Some(v), Some(v))
        }
    }
}

/// Renders a decimal with at least one fractional digit (`-200.0`, `600.2`).
pub fn format_decimal(value: f64) -> String {
    format!("{value:?}")
}
