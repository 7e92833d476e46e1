//! Parsing of user-facing range strings (`lower,upper`, `*` wildcard) and
//! partial dates into intervals.

use crate::error::RangeError;
use std::fmt::Display;

pub mod date;
pub mod number;

/// Token standing for an unbounded side of a range.
pub const WILDCARD: &str = "*";

/// Interval with independently optional bounds.
///
/// The inclusivity of each bound is decided by the producer: numeric ranges
/// are closed on both ends, date ranges are closed-open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    lower: Option<T>,
    upper: Option<T>,
}

impl<T: PartialOrd + Display> Range<T> {
    /// Builds a range, rejecting a lower bound above the upper bound.
    pub fn new(lower: Option<T>, upper: Option<T>) -> Result<Self, RangeError> {
        if let (Some(l), Some(u)) = (&lower, &upper)
            && l > u
        {
            return Err(RangeError::Inverted {
                lower: l.to_string(),
                upper: u.to_string(),
            });
        }
        Ok(Self { lower, upper })
    }
}

impl<T> Range<T> {
    pub fn unbounded() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    pub fn lower(&self) -> Option<&T> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&T> {
        self.upper.as_ref()
    }

    /// True for `*,*`: the range constrains nothing.
    pub fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }
}

/// Splits `lower,upper` into its two trimmed sides. `None` when the value
/// holds no comma.
pub fn split_range(value: &str) -> Option<(&str, &str)> {
    let (lower, upper) = value.split_once(',')?;
    Some((lower.trim(), upper.trim()))
}

pub(crate) fn bound<T>(
    raw: &str,
    parse: impl Fn(&str) -> Result<T, RangeError>,
) -> Result<Option<T>, RangeError> {
    if raw == WILDCARD || raw.is_empty() {
        Ok(None)
    } else {
        parse(raw).map(Some)
    }
}
