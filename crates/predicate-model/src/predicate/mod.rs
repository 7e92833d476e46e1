//! The predicate AST. Every variant is built through a validating
//! constructor, so a `Predicate` value is always well formed.

mod fold;
mod geo_distance;
mod json;
mod range_value;
mod validate;

pub use fold::{EqualsGroup, equals_groups, fold_all_equals};
pub use geo_distance::{Distance, DistanceUnit, GeoDistancePredicate};
pub use json::PredicateDto;
pub use range_value::RangeValue;

use crate::{
    error::{ConstructionError, GeometryError},
    geometry::{self, Shape},
    parameter::SearchParameter,
};
use tracing::warn;

/// A filter expression over search parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Equals(SimplePredicate),
    GreaterThan(SimplePredicate),
    GreaterThanOrEquals(SimplePredicate),
    LessThan(SimplePredicate),
    LessThanOrEquals(SimplePredicate),
    Like(SimplePredicate),
    In(InPredicate),
    Range(RangePredicate),
    IsNull(NullCheck),
    IsNotNull(NullCheck),
    Within(WithinPredicate),
    GeoDistance(GeoDistancePredicate),
}

/// Key/value comparison shared by `Equals`, the ordering comparisons and
/// `Like`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplePredicate {
    key: SearchParameter,
    value: String,
    match_case: bool,
    scope: Option<String>,
}

impl SimplePredicate {
    pub fn key(&self) -> &SearchParameter {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn match_case(&self) -> bool {
        self.match_case
    }

    /// Classification the key refers to, for taxonomic keys.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InPredicate {
    key: SearchParameter,
    values: Vec<String>,
    match_case: bool,
    scope: Option<String>,
}

impl InPredicate {
    pub fn key(&self) -> &SearchParameter {
        &self.key
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn match_case(&self) -> bool {
        self.match_case
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// The equality test for a single member value.
    pub fn member(&self, value: &str) -> SimplePredicate {
        SimplePredicate {
            key: self.key.clone(),
            value: value.to_string(),
            match_case: self.match_case,
            scope: self.scope.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangePredicate {
    key: SearchParameter,
    value: RangeValue,
}

impl RangePredicate {
    pub fn key(&self) -> &SearchParameter {
        &self.key
    }

    pub fn value(&self) -> &RangeValue {
        &self.value
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullCheck {
    key: SearchParameter,
    scope: Option<String>,
}

impl NullCheck {
    pub fn key(&self) -> &SearchParameter {
        &self.key
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

/// Containment in a WKT geometry. The text is kept verbatim; parsing for
/// compilation happens in the compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct WithinPredicate {
    geometry: String,
}

impl WithinPredicate {
    pub fn geometry(&self) -> &str {
        &self.geometry
    }

    /// Parses the geometry. Fails for text that was retained despite failing
    /// validation at construction.
    pub fn shape(&self) -> Result<Shape, GeometryError> {
        geometry::parse_valid(&self.geometry)
    }
}

impl Predicate {
    pub fn and(children: Vec<Predicate>) -> Result<Predicate, ConstructionError> {
        validate::non_empty_children(&children)?;
        Ok(Predicate::And(children))
    }

    pub fn or(children: Vec<Predicate>) -> Result<Predicate, ConstructionError> {
        validate::non_empty_children(&children)?;
        Ok(Predicate::Or(children))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(child: Predicate) -> Predicate {
        Predicate::Not(Box::new(child))
    }

    pub fn equals(
        key: &SearchParameter,
        value: &str,
        match_case: bool,
    ) -> Result<Predicate, ConstructionError> {
        Self::equals_in_scope(key, value, match_case, None)
    }

    pub fn equals_in_scope(
        key: &SearchParameter,
        value: &str,
        match_case: bool,
        scope: Option<&str>,
    ) -> Result<Predicate, ConstructionError> {
        validate::value(key, value)?;
        Ok(Predicate::Equals(SimplePredicate {
            key: key.clone(),
            value: value.to_string(),
            match_case,
            scope: scope.map(str::to_string),
        }))
    }

    pub fn greater_than(key: &SearchParameter, value: &str) -> Result<Predicate, ConstructionError> {
        Ok(Predicate::GreaterThan(comparison(key, value)?))
    }

    pub fn greater_than_or_equals(
        key: &SearchParameter,
        value: &str,
    ) -> Result<Predicate, ConstructionError> {
        Ok(Predicate::GreaterThanOrEquals(comparison(key, value)?))
    }

    pub fn less_than(key: &SearchParameter, value: &str) -> Result<Predicate, ConstructionError> {
        Ok(Predicate::LessThan(comparison(key, value)?))
    }

    pub fn less_than_or_equals(
        key: &SearchParameter,
        value: &str,
    ) -> Result<Predicate, ConstructionError> {
        Ok(Predicate::LessThanOrEquals(comparison(key, value)?))
    }

    /// Wildcard match with `?` (one character) and `*` (any run).
    pub fn like(
        key: &SearchParameter,
        pattern: &str,
        match_case: bool,
    ) -> Result<Predicate, ConstructionError> {
        validate::like(key, pattern)?;
        Ok(Predicate::Like(SimplePredicate {
            key: key.clone(),
            value: pattern.to_string(),
            match_case,
            scope: None,
        }))
    }

    pub fn is_in<S: AsRef<str>>(
        key: &SearchParameter,
        values: &[S],
        match_case: bool,
    ) -> Result<Predicate, ConstructionError> {
        Self::is_in_scope(key, values, match_case, None)
    }

    pub fn is_in_scope<S: AsRef<str>>(
        key: &SearchParameter,
        values: &[S],
        match_case: bool,
        scope: Option<&str>,
    ) -> Result<Predicate, ConstructionError> {
        if values.is_empty() {
            return Err(ConstructionError::EmptyValues {
                key: key.name().to_string(),
            });
        }
        for v in values {
            validate::value(key, v.as_ref())?;
        }
        Ok(Predicate::In(InPredicate {
            key: key.clone(),
            values: values.iter().map(|v| v.as_ref().to_string()).collect(),
            match_case,
            scope: scope.map(str::to_string),
        }))
    }

    pub fn range(key: &SearchParameter, value: RangeValue) -> Result<Predicate, ConstructionError> {
        validate::ordered(key)?;
        value.validate(key)?;
        Ok(Predicate::Range(RangePredicate {
            key: key.clone(),
            value,
        }))
    }

    pub fn is_null(key: &SearchParameter) -> Result<Predicate, ConstructionError> {
        Ok(Predicate::IsNull(null_check(key, None)?))
    }

    pub fn is_null_in_scope(
        key: &SearchParameter,
        scope: Option<&str>,
    ) -> Result<Predicate, ConstructionError> {
        Ok(Predicate::IsNull(null_check(key, scope)?))
    }

    pub fn is_not_null(key: &SearchParameter) -> Result<Predicate, ConstructionError> {
        Ok(Predicate::IsNotNull(null_check(key, None)?))
    }

    pub fn is_not_null_in_scope(
        key: &SearchParameter,
        scope: Option<&str>,
    ) -> Result<Predicate, ConstructionError> {
        Ok(Predicate::IsNotNull(null_check(key, scope)?))
    }

    /// Builds a `Within` predicate. Geometry validation runs eagerly but a
    /// failure is only logged: previously accepted filters must keep
    /// building, and compilation reports the error instead.
    pub fn within(geometry: &str) -> Predicate {
        if let Err(e) = geometry::parse_valid(geometry) {
            warn!(error = %e, "Retaining invalid geometry in within predicate");
        }
        Predicate::Within(WithinPredicate {
            geometry: geometry.to_string(),
        })
    }

    /// Like [`Predicate::within`], but rejects invalid geometry when `strict`.
    pub fn within_checked(geometry: &str, strict: bool) -> Result<Predicate, ConstructionError> {
        if geometry.trim().is_empty() {
            return Err(ConstructionError::InvalidGeometry(GeometryError::Empty));
        }
        if strict {
            geometry::parse_valid(geometry)?;
            return Ok(Predicate::Within(WithinPredicate {
                geometry: geometry.to_string(),
            }));
        }
        Ok(Self::within(geometry))
    }

    /// Proximity to a point, from user-facing strings (`"10km"`).
    pub fn geo_distance(
        latitude: &str,
        longitude: &str,
        distance: &str,
    ) -> Result<Predicate, ConstructionError> {
        Ok(Predicate::GeoDistance(GeoDistancePredicate::parse(
            latitude, longitude, distance,
        )?))
    }

    /// Variant name, for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Predicate::And(_) => "and",
            Predicate::Or(_) => "or",
            Predicate::Not(_) => "not",
            Predicate::Equals(_) => "equals",
            Predicate::GreaterThan(_) => "greaterThan",
            Predicate::GreaterThanOrEquals(_) => "greaterThanOrEquals",
            Predicate::LessThan(_) => "lessThan",
            Predicate::LessThanOrEquals(_) => "lessThanOrEquals",
            Predicate::Like(_) => "like",
            Predicate::In(_) => "in",
            Predicate::Range(_) => "range",
            Predicate::IsNull(_) => "isNull",
            Predicate::IsNotNull(_) => "isNotNull",
            Predicate::Within(_) => "within",
            Predicate::GeoDistance(_) => "geoDistance",
        }
    }

    /// Nesting depth; a leaf has depth 1. Walks the tree without recursion.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            match node {
                Predicate::And(children) | Predicate::Or(children) => {
                    stack.extend(children.iter().map(|c| (c, level + 1)));
                }
                Predicate::Not(child) => stack.push((child.as_ref(), level + 1)),
                _ => {}
            }
        }
        deepest
    }
}

fn comparison(key: &SearchParameter, value: &str) -> Result<SimplePredicate, ConstructionError> {
    validate::ordered(key)?;
    validate::single_value(key, value)?;
    Ok(SimplePredicate {
        key: key.clone(),
        value: value.to_string(),
        match_case: false,
        scope: None,
    })
}

fn null_check(key: &SearchParameter, scope: Option<&str>) -> Result<NullCheck, ConstructionError> {
    validate::not_geometry(key)?;
    Ok(NullCheck {
        key: key.clone(),
        scope: scope.map(str::to_string),
    })
}
