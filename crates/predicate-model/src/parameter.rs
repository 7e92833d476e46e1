use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Numeric storage class of a number-typed parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    Integer,
    Decimal,
}

/// The value type of a search parameter. Both compilers branch on this,
/// never on the parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number(NumberKind),
    Date,
    /// A date interval stored as a pair of bounds (e.g. an event date range).
    Interval,
    Boolean,
    Enum,
    /// The distinguished geometry parameter, only usable through `Within`.
    Geometry,
}

impl ValueType {
    pub fn is_number(&self) -> bool {
        matches!(self, ValueType::Number(_))
    }

    pub fn is_date_like(&self) -> bool {
        matches!(self, ValueType::Date | ValueType::Interval)
    }

    /// Whether `>`, `>=`, `<`, `<=` and range predicates make sense.
    pub fn is_ordered(&self) -> bool {
        self.is_number() || self.is_date_like()
    }
}

/// An opaque search parameter identifier carrying its value type.
///
/// Cloning is cheap; the name is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchParameter {
    name: Arc<str>,
    value_type: ValueType,
}

impl SearchParameter {
    pub fn new(name: impl AsRef<str>, value_type: ValueType) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            value_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_geometry(&self) -> bool {
        self.value_type == ValueType::Geometry
    }
}

impl fmt::Display for SearchParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Looks up parameters by name and normalizes raw values against
/// controlled vocabularies.
pub trait ParameterRegistry {
    fn lookup(&self, name: &str) -> Option<SearchParameter>;

    /// Canonical form of a raw value. Identity unless the deployment knows
    /// better (enum names, boolean case).
    fn normalize_value(&self, key: &SearchParameter, value: &str) -> String {
        match key.value_type() {
            ValueType::Boolean => value.to_lowercase(),
            _ => value.to_string(),
        }
    }
}
