//! Lowers predicates into a boolean query tree.
//!
//! Every predicate is compiled into a [`Frame`]: the bool container it adds
//! its clauses to, plus the raw clause when the predicate addresses a nested
//! object. Compound predicates use the raw clauses to merge siblings that
//! share a nested path into one `nested` node, so they constrain the same
//! nested object.

use crate::{
    geo,
    query::{BoolQuery, Query, RangeQuery},
    resolver::SearchFieldResolver,
};
use predicate_model::{
    CompileError, CompilerSettings, Predicate, PredicateCompiler, SearchParameter, ValueType,
    compiler::check_depth,
    parameter::NumberKind,
    predicate::{
        GeoDistancePredicate, InPredicate, NullCheck, RangePredicate, SimplePredicate,
        WithinPredicate, equals_groups,
    },
    range::{date, number},
};
use serde_json::Value;
use tracing::debug;

pub struct SearchCompiler<'a> {
    resolver: &'a dyn SearchFieldResolver,
    max_depth: usize,
}

#[derive(Default)]
struct Frame {
    query: BoolQuery,
    nested: Option<NestedClause>,
}

/// A clause that belongs inside `nested(path)`.
struct NestedClause {
    path: String,
    query: Query,
}

/// Clauses grouped by nested path, in first-seen order.
#[derive(Default)]
struct NestedGroups(Vec<(String, Vec<Query>)>);

impl NestedGroups {
    fn push(&mut self, path: String, query: Query) {
        match self.0.iter_mut().find(|(p, _)| *p == path) {
            Some((_, queries)) => queries.push(query),
            None => self.0.push((path, vec![query])),
        }
    }
}

/// Which side a comparison bounds, and whether it includes the value.
#[derive(Clone, Copy)]
enum Bound {
    Gte,
    Gt,
    Lte,
    Lt,
}

#[derive(Clone, Copy)]
enum Combine {
    All,
    Any,
}

impl Combine {
    fn clauses(self, query: &mut BoolQuery) -> &mut Vec<Query> {
        match self {
            Combine::All => &mut query.filter,
            Combine::Any => &mut query.should,
        }
    }

    fn wrap(self, queries: Vec<Query>) -> BoolQuery {
        let mut query = BoolQuery::default();
        *self.clauses(&mut query) = queries;
        query
    }
}

impl<'a> SearchCompiler<'a> {
    pub fn new(resolver: &'a dyn SearchFieldResolver) -> Self {
        Self::with_settings(resolver, &CompilerSettings::default())
    }

    pub fn with_settings(resolver: &'a dyn SearchFieldResolver, settings: &CompilerSettings) -> Self {
        Self {
            resolver,
            max_depth: settings.max_depth,
        }
    }

    fn visit(&self, predicate: &Predicate, frame: &mut Frame) -> Result<(), CompileError> {
        match predicate {
            Predicate::And(children) => self.visit_compound(children, Combine::All, frame),
            Predicate::Or(children) => self.visit_disjunction(children, frame),
            Predicate::Not(child) => {
                let mut inner = Frame::default();
                self.visit(child, &mut inner)?;
                frame.query.must_not.push(Query::Bool(inner.query));
                Ok(())
            }
            Predicate::Equals(p) => self.visit_equals(predicate, p, frame),
            Predicate::GreaterThan(p) => self.visit_comparison(predicate, p, Bound::Gt, frame),
            Predicate::GreaterThanOrEquals(p) => {
                self.visit_comparison(predicate, p, Bound::Gte, frame)
            }
            Predicate::LessThan(p) => self.visit_comparison(predicate, p, Bound::Lt, frame),
            Predicate::LessThanOrEquals(p) => {
                self.visit_comparison(predicate, p, Bound::Lte, frame)
            }
            Predicate::Like(p) => {
                let q = Query::Wildcard {
                    field: self.match_field(p.key(), p.match_case(), p.scope())?,
                    pattern: p.value().to_string(),
                };
                self.add_filter(q, p.key(), frame);
                Ok(())
            }
            Predicate::In(p) => self.visit_in(p, frame),
            Predicate::Range(p) => self.visit_range(p, frame),
            Predicate::IsNull(p) => {
                let q = Query::missing(&self.null_check_field(p)?);
                self.add_filter(q, p.key(), frame);
                Ok(())
            }
            Predicate::IsNotNull(p) => {
                let q = Query::Exists {
                    field: self.null_check_field(p)?,
                };
                self.add_filter(q, p.key(), frame);
                Ok(())
            }
            Predicate::Within(p) => {
                frame.query.filter.push(self.geo_shape(p)?);
                Ok(())
            }
            Predicate::GeoDistance(p) => {
                frame.query.filter.push(self.geo_distance(p));
                Ok(())
            }
        }
    }

    /// Each child compiles into its own bool so sibling clauses never mix.
    fn visit_compound(
        &self,
        children: &[Predicate],
        combine: Combine,
        frame: &mut Frame,
    ) -> Result<(), CompileError> {
        let mut nested = NestedGroups::default();
        let mut plain = false;

        for child in children {
            let mut inner = Frame::default();
            self.visit(child, &mut inner)?;
            match inner.nested {
                Some(clause) => nested.push(clause.path, clause.query),
                None => {
                    combine.clauses(&mut frame.query).push(Query::Bool(inner.query));
                    plain = true;
                }
            }
        }

        self.close_nested(nested, combine, plain, frame);
        Ok(())
    }

    /// Writes one `nested` node per path. The frame itself counts as nested
    /// only when everything it holds sits under a single path; otherwise an
    /// enclosing compound keeps it whole.
    fn close_nested(&self, nested: NestedGroups, combine: Combine, plain: bool, frame: &mut Frame) {
        let single_path = !plain && nested.0.len() == 1;
        for (path, queries) in nested.0 {
            let inner = Query::Bool(combine.wrap(queries));
            combine
                .clauses(&mut frame.query)
                .push(Query::nested(&path, inner.clone()));
            if single_path {
                frame.nested = Some(NestedClause { path, query: inner });
            }
        }
    }

    /// Equalities on one key are folded into a `terms` clause; the rest
    /// become `should` clauses.
    fn visit_disjunction(&self, children: &[Predicate], frame: &mut Frame) -> Result<(), CompileError> {
        let groups = equals_groups(children, |p| p.scope().is_none() && !self.is_range_shaped(p));

        let mut nested = NestedGroups::default();
        let mut plain = false;

        for (index, child) in children.iter().enumerate() {
            if groups.iter().any(|g| g.contains(index)) {
                continue;
            }
            let mut inner = Frame::default();
            self.visit(child, &mut inner)?;
            match inner.nested {
                Some(clause) => nested.push(clause.path, clause.query),
                None => {
                    frame.query.should.push(Query::Bool(inner.query));
                    plain = true;
                }
            }
        }

        for group in &groups {
            debug!(
                key = %group.key(),
                members = group.members().len(),
                "Folding equalities into terms"
            );
            let terms = Query::Terms {
                field: self.match_field(group.key(), group.match_case(), None)?,
                values: group.values().to_vec(),
            };
            match self.resolver.nested_path(group.key()) {
                Some(path) => nested.push(path.to_string(), terms),
                None => {
                    frame.query.should.push(terms);
                    plain = true;
                }
            }
        }

        self.close_nested(nested, Combine::Any, plain, frame);
        Ok(())
    }

    fn visit_equals(
        &self,
        predicate: &Predicate,
        p: &SimplePredicate,
        frame: &mut Frame,
    ) -> Result<(), CompileError> {
        let key = p.key();
        let value = p.value();
        let invalid = |e| CompileError::invalid_value(key.name(), value, e);

        let q = match self.resolver.value_type(key) {
            ValueType::Number(_) if number::is_numeric_range(value) => {
                let range = number::parse_decimal_range(value).map_err(invalid)?;
                if range.is_unbounded() {
                    return self.match_all(key, frame);
                }
                let mut q = RangeQuery::new(self.exact_field(key)?);
                if self.resolver.is_numeric_interval(key) {
                    q = q.within();
                }
                q.from = range.lower().map(|v| Value::from(*v));
                q.to = range.upper().map(|v| Value::from(*v));
                self.with_null(predicate, key, Query::Range(q))?
            }
            ValueType::Number(_) if self.resolver.is_numeric_interval(key) => {
                let q = Query::Term {
                    field: self.exact_field(key)?,
                    value: value.trim().to_string(),
                };
                self.with_null(predicate, key, q)?
            }
            ValueType::Date | ValueType::Interval => {
                let range = date::parse_date_range(value).map_err(invalid)?;
                if range.is_unbounded() {
                    return self.match_all(key, frame);
                }
                let mut q = RangeQuery::new(self.exact_field(key)?).within();
                q.from = range.lower().map(|d| Value::from(d.to_string()));
                q.to = range.upper().map(|d| Value::from(d.to_string()));
                q.include_upper = false;
                self.with_null(predicate, key, Query::Range(q))?
            }
            _ => Query::Term {
                field: self.match_field(key, p.match_case(), p.scope())?,
                value: value.to_string(),
            },
        };
        self.add_filter(q, key, frame);
        Ok(())
    }

    /// An equality constraining nothing. The frame still records the key's
    /// nested path so siblings group the same way.
    fn match_all(&self, key: &SearchParameter, frame: &mut Frame) -> Result<(), CompileError> {
        self.add_filter(Query::MatchAll, key, frame);
        Ok(())
    }

    fn visit_in(&self, p: &InPredicate, frame: &mut Frame) -> Result<(), CompileError> {
        if self.resolver.value_type(p.key()) == ValueType::Interval
            || self.resolver.is_numeric_interval(p.key())
        {
            for value in p.values() {
                let member = p.member(value);
                let as_equals = Predicate::Equals(member.clone());
                let mut inner = Frame::default();
                self.visit_equals(&as_equals, &member, &mut inner)?;
                frame.query.should.push(Query::Bool(inner.query));
            }
            return Ok(());
        }

        let q = Query::Terms {
            field: self.match_field(p.key(), p.match_case(), p.scope())?,
            values: p.values().to_vec(),
        };
        self.add_filter(q, p.key(), frame);
        Ok(())
    }

    fn visit_range(&self, p: &RangePredicate, frame: &mut Frame) -> Result<(), CompileError> {
        let key = p.key();
        let bounds = p.value();
        let mut q = RangeQuery::new(self.exact_field(key)?);

        for (raw, bound) in [
            (&bounds.gte, Bound::Gte),
            (&bounds.gt, Bound::Gt),
            (&bounds.lte, Bound::Lte),
            (&bounds.lt, Bound::Lt),
        ] {
            if let Some(raw) = raw {
                q = self.bounded(q, key, raw, bound)?;
            }
        }

        self.add_filter(Query::Range(q), key, frame);
        Ok(())
    }

    fn visit_comparison(
        &self,
        predicate: &Predicate,
        p: &SimplePredicate,
        bound: Bound,
        frame: &mut Frame,
    ) -> Result<(), CompileError> {
        let key = p.key();
        let range = self.bounded(RangeQuery::new(self.exact_field(key)?), key, p.value(), bound)?;
        let q = self.with_null(predicate, key, Query::Range(range))?;
        self.add_filter(q, key, frame);
        Ok(())
    }

    /// Applies one bound. A partial date stands for its calendar interval:
    /// `>=` and `<=` include it, `>` and `<` exclude it, and the upper side
    /// is always exclusive.
    fn bounded(
        &self,
        q: RangeQuery,
        key: &SearchParameter,
        raw: &str,
        bound: Bound,
    ) -> Result<RangeQuery, CompileError> {
        if self.resolver.value_type(key).is_date_like() {
            let (start, end) = date::calendar_interval(raw)
                .map_err(|e| CompileError::invalid_value(key.name(), raw, e))?;
            return Ok(match bound {
                Bound::Gte => q.gte(start.to_string()),
                Bound::Gt => q.gte(end.to_string()),
                Bound::Lte => q.lt(end.to_string()),
                Bound::Lt => q.lt(start.to_string()),
            });
        }
        let v = self.typed(key, raw)?;
        Ok(match bound {
            Bound::Gte => q.gte(v),
            Bound::Gt => q.gt(v),
            Bound::Lte => q.lte(v),
            Bound::Lt => q.lt(v),
        })
    }

    /// A bound as the index stores a number; other values as written.
    fn typed(&self, key: &SearchParameter, raw: &str) -> Result<Value, CompileError> {
        let value = match self.resolver.value_type(key) {
            ValueType::Number(NumberKind::Integer) => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| CompileError::invalid_value(key.name(), raw, e))?,
            ValueType::Number(NumberKind::Decimal) => raw
                .trim()
                .parse::<f64>()
                .map(Value::from)
                .map_err(|e| CompileError::invalid_value(key.name(), raw, e))?,
            _ => Value::from(raw),
        };
        Ok(value)
    }

    /// Accepts records without a value when the resolver asks for it.
    fn with_null(&self, predicate: &Predicate, key: &SearchParameter, q: Query) -> Result<Query, CompileError> {
        if !self.resolver.include_null_in_predicate(predicate) {
            return Ok(q);
        }
        Ok(Query::Bool(BoolQuery {
            should: vec![q, Query::missing(&self.exact_field(key)?)],
            ..BoolQuery::default()
        }))
    }

    fn add_filter(&self, q: Query, key: &SearchParameter, frame: &mut Frame) {
        match self.resolver.nested_path(key) {
            Some(path) => {
                frame.query.filter.push(Query::nested(path, q.clone()));
                frame.nested = Some(NestedClause {
                    path: path.to_string(),
                    query: q,
                });
            }
            None => frame.query.filter.push(q),
        }
    }

    fn exact_field(&self, key: &SearchParameter) -> Result<String, CompileError> {
        self.resolver
            .field_name(key, false)
            .ok_or_else(|| CompileError::UnmappedParameter(key.name().to_string()))
    }

    /// Taxonomic keys address their classification; other keys the keyword
    /// or verbatim field.
    fn match_field(
        &self,
        key: &SearchParameter,
        match_case: bool,
        scope: Option<&str>,
    ) -> Result<String, CompileError> {
        let field = if self.resolver.is_taxonomic(key) {
            let tag = scope.unwrap_or_else(|| self.resolver.default_scope_tag());
            self.resolver.scoped_field(key, tag)
        } else {
            self.resolver.field_name(key, match_case)
        };
        field.ok_or_else(|| CompileError::UnmappedParameter(key.name().to_string()))
    }

    fn null_check_field(&self, p: &NullCheck) -> Result<String, CompileError> {
        self.match_field(p.key(), false, p.scope())
    }

    fn geo_shape(&self, p: &WithinPredicate) -> Result<Query, CompileError> {
        let shape = p.shape()?.normalized();
        Ok(Query::GeoShape {
            field: self.resolver.geo_shape_field().to_string(),
            shape: geo::geojson(&shape),
        })
    }

    fn geo_distance(&self, p: &GeoDistancePredicate) -> Query {
        Query::GeoDistance {
            field: self.resolver.geo_point_field().to_string(),
            latitude: p.latitude(),
            longitude: p.longitude(),
            metres: p.distance().in_metres(),
        }
    }

    /// Range-shaped equalities compile to range filters and cannot be
    /// folded. Numeric interval keys never fold either.
    fn is_range_shaped(&self, p: &SimplePredicate) -> bool {
        if self.resolver.is_numeric_interval(p.key()) {
            return true;
        }
        match self.resolver.value_type(p.key()) {
            ValueType::Date | ValueType::Interval => true,
            ValueType::Number(_) => number::is_numeric_range(p.value()),
            _ => false,
        }
    }
}

impl PredicateCompiler for SearchCompiler<'_> {
    type Output = Query;

    fn compile(&self, predicate: Option<&Predicate>) -> Result<Query, CompileError> {
        let Some(predicate) = predicate else {
            return Ok(Query::MatchAll);
        };
        check_depth(predicate, self.max_depth)?;
        debug!(kind = predicate.kind(), "Compiling search query");

        let mut root = Frame::default();
        self.visit(predicate, &mut root)?;
        Ok(Query::Bool(root.query))
    }
}
