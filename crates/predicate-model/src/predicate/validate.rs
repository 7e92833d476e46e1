use super::Predicate;
use crate::{
    error::{ConstructionError, RangeError},
    parameter::{NumberKind, SearchParameter, ValueType},
    range::{date, number},
};

pub(super) fn non_empty_children(children: &[Predicate]) -> Result<(), ConstructionError> {
    if children.is_empty() {
        return Err(ConstructionError::EmptyCompound);
    }
    Ok(())
}

pub(super) fn not_geometry(key: &SearchParameter) -> Result<(), ConstructionError> {
    if key.is_geometry() {
        return Err(ConstructionError::GeometryKey {
            key: key.name().to_string(),
        });
    }
    Ok(())
}

pub(super) fn ordered(key: &SearchParameter) -> Result<(), ConstructionError> {
    if !key.value_type().is_ordered() {
        return Err(ConstructionError::NonEqualsComparison {
            key: key.name().to_string(),
        });
    }
    Ok(())
}

fn non_empty(key: &SearchParameter, value: &str) -> Result<(), ConstructionError> {
    if value.trim().is_empty() {
        return Err(ConstructionError::EmptyValue {
            key: key.name().to_string(),
        });
    }
    Ok(())
}

fn invalid(key: &SearchParameter, value: &str, reason: impl ToString) -> ConstructionError {
    ConstructionError::InvalidValue {
        key: key.name().to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Checks an equality value: single values and `lower,upper` ranges are
/// both accepted for number and date keys.
pub(super) fn value(key: &SearchParameter, value: &str) -> Result<(), ConstructionError> {
    non_empty(key, value)?;
    not_geometry(key)?;

    let checked: Result<(), RangeError> = match key.value_type() {
        ValueType::Number(NumberKind::Integer) => number::parse_integer_range(value).map(drop),
        ValueType::Number(NumberKind::Decimal) => number::parse_decimal_range(value).map(drop),
        ValueType::Date | ValueType::Interval => date::parse_date_range(value).map(drop),
        ValueType::Boolean => match value.to_lowercase().as_str() {
            "true" | "false" => Ok(()),
            _ => return Err(invalid(key, value, "expected true or false")),
        },
        ValueType::String | ValueType::Enum | ValueType::Geometry => Ok(()),
    };
    checked.map_err(|e| invalid(key, value, e))
}

/// Checks the operand of `>`, `>=`, `<`, `<=`: one number or one partial date.
pub(super) fn single_value(key: &SearchParameter, value: &str) -> Result<(), ConstructionError> {
    non_empty(key, value)?;
    let ok = match key.value_type() {
        ValueType::Number(NumberKind::Integer) => number::is_integer(value),
        ValueType::Number(NumberKind::Decimal) => number::is_decimal(value),
        ValueType::Date | ValueType::Interval => date::is_date(value),
        _ => false,
    };
    if !ok {
        return Err(invalid(key, value, "expected a single number or date"));
    }
    Ok(())
}

pub(super) fn like(key: &SearchParameter, pattern: &str) -> Result<(), ConstructionError> {
    non_empty(key, pattern)?;
    not_geometry(key)?;
    if key.value_type() != ValueType::String {
        return Err(ConstructionError::LikeNotAllowed {
            key: key.name().to_string(),
        });
    }
    Ok(())
}
