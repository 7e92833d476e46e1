//! The boolean query tree produced by the search compiler, and its
//! rendering in the engine's JSON query dialect.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll,
    Bool(BoolQuery),
    Term {
        field: String,
        value: String,
    },
    Terms {
        field: String,
        values: Vec<String>,
    },
    Range(RangeQuery),
    Wildcard {
        field: String,
        pattern: String,
    },
    Exists {
        field: String,
    },
    GeoShape {
        field: String,
        shape: Value,
    },
    GeoDistance {
        field: String,
        latitude: f64,
        longitude: f64,
        metres: f64,
    },
    Nested {
        path: String,
        query: Box<Query>,
    },
}

/// All-of (`filter`), any-of (`should`) and none-of (`must_not`) clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub filter: Vec<Query>,
    pub should: Vec<Query>,
    pub must_not: Vec<Query>,
}

/// A range filter. Missing bounds render as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    pub field: String,
    pub from: Option<Value>,
    pub to: Option<Value>,
    pub include_lower: bool,
    pub include_upper: bool,
    /// Set for interval-valued fields, where the whole stored interval must
    /// fall inside the query range.
    pub relation: Option<&'static str>,
}

impl RangeQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            from: None,
            to: None,
            include_lower: true,
            include_upper: true,
            relation: None,
        }
    }

    pub fn gte(mut self, value: impl Into<Value>) -> Self {
        self.from = Some(value.into());
        self.include_lower = true;
        self
    }

    pub fn gt(mut self, value: impl Into<Value>) -> Self {
        self.from = Some(value.into());
        self.include_lower = false;
        self
    }

    pub fn lte(mut self, value: impl Into<Value>) -> Self {
        self.to = Some(value.into());
        self.include_upper = true;
        self
    }

    pub fn lt(mut self, value: impl Into<Value>) -> Self {
        self.to = Some(value.into());
        self.include_upper = false;
        self
    }

    pub fn within(mut self) -> Self {
        self.relation = Some("within");
        self
    }
}

impl Query {
    pub fn nested(path: &str, query: Query) -> Query {
        Query::Nested {
            path: path.to_string(),
            query: Box::new(query),
        }
    }

    /// `bool.must_not: [exists]`
    pub fn missing(field: &str) -> Query {
        Query::Bool(BoolQuery {
            must_not: vec![Query::Exists {
                field: field.to_string(),
            }],
            ..BoolQuery::default()
        })
    }

    pub fn to_json(&self) -> Value {
        match self {
            Query::MatchAll => json!({ "match_all": {} }),
            Query::Bool(b) => {
                let mut clauses = Map::new();
                for (name, queries) in [
                    ("filter", &b.filter),
                    ("should", &b.should),
                    ("must_not", &b.must_not),
                ] {
                    if !queries.is_empty() {
                        let rendered = queries.iter().map(Query::to_json).collect();
                        clauses.insert(name.to_string(), Value::Array(rendered));
                    }
                }
                json!({ "bool": clauses })
            }
            Query::Term { field, value } => json!({ "term": { field: { "value": value } } }),
            Query::Terms { field, values } => json!({ "terms": { field: values } }),
            Query::Range(r) => {
                let mut body = json!({
                    "from": r.from,
                    "to": r.to,
                    "include_lower": r.include_lower,
                    "include_upper": r.include_upper,
                });
                if let Some(relation) = r.relation {
                    body["relation"] = json!(relation);
                }
                json!({ "range": { &r.field: body } })
            }
            Query::Wildcard { field, pattern } => {
                json!({ "wildcard": { field: { "wildcard": pattern } } })
            }
            Query::Exists { field } => json!({ "exists": { "field": field } }),
            Query::GeoShape { field, shape } => {
                json!({ "geo_shape": { field: { "shape": shape, "relation": "within" } } })
            }
            Query::GeoDistance {
                field,
                latitude,
                longitude,
                metres,
            } => json!({
                "geo_distance": {
                    field: [longitude, latitude],
                    "distance": metres,
                }
            }),
            Query::Nested { path, query } => json!({
                "nested": {
                    "path": path,
                    "query": query.to_json(),
                    "score_mode": "none",
                }
            }),
        }
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_clauses_are_omitted() {
        let q = Query::Bool(BoolQuery {
            filter: vec![Query::Term {
                field: "catalog_number.keyword".into(),
                value: "value".into(),
            }],
            ..BoolQuery::default()
        });
        assert_eq!(
            q.to_json(),
            json!({"bool": {"filter": [{"term": {"catalog_number.keyword": {"value": "value"}}}]}})
        );
    }

    #[test]
    fn test_range_rendering() {
        let q = Query::Range(RangeQuery::new("elevation").lte(600.0));
        assert_eq!(
            q.to_json(),
            json!({"range": {"elevation": {
                "from": null, "to": 600.0, "include_lower": true, "include_upper": true
            }}})
        );

        let q = Query::Range(RangeQuery::new("event_date").gte("1980-01-01").lt("1981-01-01").within());
        assert_eq!(
            q.to_json()["range"]["event_date"]["relation"],
            json!("within")
        );
    }

    #[test]
    fn test_missing() {
        assert_eq!(
            Query::missing("year").to_json(),
            json!({"bool": {"must_not": [{"exists": {"field": "year"}}]}})
        );
    }
}
