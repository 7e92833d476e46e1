//! Wire form of predicates, tagged by `type`:
//!
//! ```json
//! {"type":"and","predicates":[
//!   {"type":"equals","key":"CATALOG_NUMBER","value":"A-12","matchCase":false},
//!   {"type":"isNotNull","parameter":"YEAR"}
//! ]}
//! ```
//!
//! Keys travel as parameter names, so turning a [`PredicateDto`] back into a
//! [`Predicate`] needs a [`ParameterRegistry`].

use super::{Predicate, RangeValue, SimplePredicate};
use crate::{
    error::ConstructionError,
    parameter::{ParameterRegistry, SearchParameter},
};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PredicateDto {
    And { predicates: Vec<PredicateDto> },
    Or { predicates: Vec<PredicateDto> },
    Not { predicate: Box<PredicateDto> },
    Equals(SimpleDto),
    GreaterThan(SimpleDto),
    GreaterThanOrEquals(SimpleDto),
    LessThan(SimpleDto),
    LessThanOrEquals(SimpleDto),
    Like(SimpleDto),
    In(InDto),
    Range { key: String, value: RangeValue },
    IsNull(NullDto),
    IsNotNull(NullDto),
    Within { geometry: String },
    GeoDistance {
        latitude: String,
        longitude: String,
        distance: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleDto {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub match_case: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InDto {
    pub key: String,
    pub values: Vec<String>,
    #[serde(default)]
    pub match_case: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NullDto {
    pub parameter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist_key: Option<String>,
}

impl PredicateDto {
    /// Builds the predicate, running the same validation as the
    /// constructors. With `strict_geometry`, invalid WKT is rejected.
    pub fn resolve<R>(&self, registry: &R, strict_geometry: bool) -> Result<Predicate, ConstructionError>
    where
        R: ParameterRegistry + ?Sized,
    {
        let key = |name: &str| {
            registry
                .lookup(name)
                .ok_or_else(|| ConstructionError::UnknownParameter(name.to_string()))
        };
        let children = |dtos: &[PredicateDto]| {
            dtos.iter()
                .map(|d| d.resolve(registry, strict_geometry))
                .collect::<Result<Vec<_>, _>>()
        };

        match self {
            PredicateDto::And { predicates } => Predicate::and(children(predicates)?),
            PredicateDto::Or { predicates } => Predicate::or(children(predicates)?),
            PredicateDto::Not { predicate } => {
                Ok(Predicate::not(predicate.resolve(registry, strict_geometry)?))
            }
            PredicateDto::Equals(s) => {
                let k = key(&s.key)?;
                let value = registry.normalize_value(&k, &s.value);
                Predicate::equals_in_scope(&k, &value, s.match_case, s.checklist_key.as_deref())
            }
            PredicateDto::GreaterThan(s) => Predicate::greater_than(&key(&s.key)?, &s.value),
            PredicateDto::GreaterThanOrEquals(s) => {
                Predicate::greater_than_or_equals(&key(&s.key)?, &s.value)
            }
            PredicateDto::LessThan(s) => Predicate::less_than(&key(&s.key)?, &s.value),
            PredicateDto::LessThanOrEquals(s) => {
                Predicate::less_than_or_equals(&key(&s.key)?, &s.value)
            }
            PredicateDto::Like(s) => Predicate::like(&key(&s.key)?, &s.value, s.match_case),
            PredicateDto::In(i) => {
                let k = key(&i.key)?;
                let values: Vec<String> = i
                    .values
                    .iter()
                    .map(|v| registry.normalize_value(&k, v))
                    .collect();
                Predicate::is_in_scope(&k, &values, i.match_case, i.checklist_key.as_deref())
            }
            PredicateDto::Range { key: name, value } => Predicate::range(&key(name)?, value.clone()),
            PredicateDto::IsNull(n) => {
                Predicate::is_null_in_scope(&key(&n.parameter)?, n.checklist_key.as_deref())
            }
            PredicateDto::IsNotNull(n) => {
                Predicate::is_not_null_in_scope(&key(&n.parameter)?, n.checklist_key.as_deref())
            }
            PredicateDto::Within { geometry } => Predicate::within_checked(geometry, strict_geometry),
            PredicateDto::GeoDistance {
                latitude,
                longitude,
                distance,
            } => Predicate::geo_distance(latitude, longitude, distance),
        }
    }
}

fn simple(p: &SimplePredicate) -> SimpleDto {
    SimpleDto {
        key: p.key().name().to_string(),
        value: p.value().to_string(),
        match_case: p.match_case(),
        checklist_key: p.scope().map(str::to_string),
    }
}

fn name(key: &SearchParameter) -> String {
    key.name().to_string()
}

impl From<&Predicate> for PredicateDto {
    fn from(p: &Predicate) -> Self {
        match p {
            Predicate::And(children) => PredicateDto::And {
                predicates: children.iter().map(PredicateDto::from).collect(),
            },
            Predicate::Or(children) => PredicateDto::Or {
                predicates: children.iter().map(PredicateDto::from).collect(),
            },
            Predicate::Not(child) => PredicateDto::Not {
                predicate: Box::new(PredicateDto::from(child.as_ref())),
            },
            Predicate::Equals(s) => PredicateDto::Equals(simple(s)),
            Predicate::GreaterThan(s) => PredicateDto::GreaterThan(simple(s)),
            Predicate::GreaterThanOrEquals(s) => PredicateDto::GreaterThanOrEquals(simple(s)),
            Predicate::LessThan(s) => PredicateDto::LessThan(simple(s)),
            Predicate::LessThanOrEquals(s) => PredicateDto::LessThanOrEquals(simple(s)),
            Predicate::Like(s) => PredicateDto::Like(simple(s)),
            Predicate::In(i) => PredicateDto::In(InDto {
                key: name(i.key()),
                values: i.values().to_vec(),
                match_case: i.match_case(),
                checklist_key: i.scope().map(str::to_string),
            }),
            Predicate::Range(r) => PredicateDto::Range {
                key: name(r.key()),
                value: r.value().clone(),
            },
            Predicate::IsNull(n) => PredicateDto::IsNull(NullDto {
                parameter: name(n.key()),
                checklist_key: n.scope().map(str::to_string),
            }),
            Predicate::IsNotNull(n) => PredicateDto::IsNotNull(NullDto {
                parameter: name(n.key()),
                checklist_key: n.scope().map(str::to_string),
            }),
            Predicate::Within(w) => PredicateDto::Within {
                geometry: w.geometry().to_string(),
            },
            Predicate::GeoDistance(g) => PredicateDto::GeoDistance {
                latitude: g.latitude().to_string(),
                longitude: g.longitude().to_string(),
                distance: g.distance().to_string(),
            },
        }
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PredicateDto::from(self).serialize(serializer)
    }
}
