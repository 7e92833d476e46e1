//! Lowers predicates into the body of a SQL `WHERE` clause.
//!
//! Every sub-expression is parenthesized so the result does not depend on
//! the engine's operator precedence. Keys the tables store in several
//! columns (rank columns, administrative levels, interval bounds) or as
//! arrays expand into the matching combination of column tests.

use crate::{
    dialect::{Dialect, dialect_for},
    geo::{Containment, Proximity},
    renderer::{Render, Renderer, like_pattern, lower, quote, quote_pattern},
    resolver::SqlFieldResolver,
};
use predicate_model::{
    CompileError, CompilerSettings, Predicate, PredicateCompiler, SearchParameter, ValueType,
    compiler::check_depth,
    parameter::NumberKind,
    predicate::{InPredicate, NullCheck, RangePredicate, SimplePredicate, fold_all_equals},
    range::{date, number},
};
use tracing::debug;

/// `WHERE` body matching every row.
pub const MATCH_ALL: &str = "true";

pub struct SqlCompiler<'a> {
    resolver: &'a dyn SqlFieldResolver,
    dialect: &'a dyn Dialect,
    bbox_batch_size: usize,
    per_ring_bbox_threshold: usize,
    max_depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
}

impl Comparison {
    fn symbol(self) -> &'static str {
        match self {
            Comparison::GreaterThan => ">",
            Comparison::GreaterThanOrEquals => ">=",
            Comparison::LessThan => "<",
            Comparison::LessThanOrEquals => "<=",
        }
    }
}

impl<'a> SqlCompiler<'a> {
    pub fn new(resolver: &'a dyn SqlFieldResolver) -> Self {
        Self::with_settings(resolver, &CompilerSettings::default())
    }

    pub fn with_settings(resolver: &'a dyn SqlFieldResolver, settings: &CompilerSettings) -> Self {
        Self {
            resolver,
            dialect: dialect_for(settings.sql_dialect),
            bbox_batch_size: settings.bbox_batch_size,
            per_ring_bbox_threshold: settings.per_ring_bbox_threshold,
            max_depth: settings.max_depth,
        }
    }

    /// Overrides the dialect chosen by the settings.
    pub fn with_dialect(mut self, dialect: &'a dyn Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    fn visit(&self, predicate: &Predicate, r: &mut Renderer) -> Result<(), CompileError> {
        match predicate {
            Predicate::And(children) => self.visit_compound(children, " AND ", r),
            Predicate::Or(children) => self.visit_disjunction(children, r),
            Predicate::Not(child) => {
                r.sql.push_str("NOT ");
                self.visit(child, r)
            }
            Predicate::Equals(p) => self.visit_equals(predicate, p, r),
            Predicate::GreaterThan(p) => {
                self.visit_comparison(predicate, p, Comparison::GreaterThan, r)
            }
            Predicate::GreaterThanOrEquals(p) => {
                self.visit_comparison(predicate, p, Comparison::GreaterThanOrEquals, r)
            }
            Predicate::LessThan(p) => self.visit_comparison(predicate, p, Comparison::LessThan, r),
            Predicate::LessThanOrEquals(p) => {
                self.visit_comparison(predicate, p, Comparison::LessThanOrEquals, r)
            }
            Predicate::Like(p) => self.visit_like(p, r),
            Predicate::In(p) => self.visit_in(p, r),
            Predicate::Range(p) => self.visit_range(p, r),
            Predicate::IsNull(p) => self.visit_null_check(p, false, r),
            Predicate::IsNotNull(p) => self.visit_null_check(p, true, r),
            Predicate::Within(p) => {
                let shape = p.shape()?.normalized();
                Containment {
                    shape: &shape,
                    latitude: self.resolver.latitude_column(),
                    longitude: self.resolver.longitude_column(),
                    batch_size: self.bbox_batch_size,
                    per_ring_threshold: self.per_ring_bbox_threshold,
                }
                .render(r);
                Ok(())
            }
            Predicate::GeoDistance(p) => {
                Proximity {
                    predicate: p,
                    latitude: self.resolver.latitude_column(),
                    longitude: self.resolver.longitude_column(),
                }
                .render(r);
                Ok(())
            }
        }
    }

    /// `((child) op (child) ... op (child))`
    fn visit_compound(
        &self,
        children: &[Predicate],
        op: &str,
        r: &mut Renderer,
    ) -> Result<(), CompileError> {
        r.sql.push('(');
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(op);
            }
            r.sql.push('(');
            self.visit(child, r)?;
            r.sql.push(')');
        }
        r.sql.push(')');
        Ok(())
    }

    /// A disjunction made only of equalities on one key compiles as `IN`.
    fn visit_disjunction(&self, children: &[Predicate], r: &mut Renderer) -> Result<(), CompileError> {
        match fold_all_equals(children, |p| self.foldable(p)) {
            Some(folded) => {
                debug!(members = children.len(), "Folding equalities into IN");
                self.visit(&folded, r)
            }
            None => self.visit_compound(children, " OR ", r),
        }
    }

    fn foldable(&self, p: &SimplePredicate) -> bool {
        if self.resolver.is_numeric_interval(p.key()) {
            return false;
        }
        match self.resolver.value_type(p.key()) {
            ValueType::Date | ValueType::Interval => false,
            ValueType::Number(_) => !number::is_numeric_range(p.value()),
            _ => true,
        }
    }

    fn visit_equals(
        &self,
        predicate: &Predicate,
        p: &SimplePredicate,
        r: &mut Renderer,
    ) -> Result<(), CompileError> {
        let key = p.key();
        let value = p.value();

        if self.resolver.is_taxonomic(key) {
            let clause = self.taxon_equals(key, value, p.scope())?;
            r.sql.push_str(&clause);
            return Ok(());
        }

        let levels = self.resolver.level_columns(key);
        if !levels.is_empty() {
            let literal = quote(&value.to_uppercase());
            r.sql.push('(');
            r.push_joined(levels.iter().map(|c| format!("{c} = {literal}")), " OR ");
            r.sql.push(')');
            return Ok(());
        }

        if self.is_array_like(key) {
            let column = self.column(key, false)?;
            if self.resolver.value_type(key) == ValueType::Enum {
                r.push_array_contains(&column, &value.to_uppercase(), true);
            } else {
                r.push_array_contains(&column, value, p.match_case());
            }
            return Ok(());
        }

        if self.resolver.is_denormalized(key) {
            let legacy = self.legacy_column(key)?;
            r.sql.push_str("((");
            r.sql.push_str(&self.simple(key, "=", value, p.match_case())?);
            r.sql.push_str(&format!(
                ") OR (array_contains({legacy},{})))",
                self.sql_value(key, value, true)?
            ));
            return Ok(());
        }

        if self.resolver.is_numeric_interval(key) {
            let clause = self.span_equals(key, value)?;
            r.sql.push_str(&self.with_null(predicate, key, clause)?);
            return Ok(());
        }

        let clause = match self.resolver.value_type(key) {
            ValueType::Date | ValueType::Interval => self.date_equals(key, value)?,
            ValueType::Number(kind) if number::is_numeric_range(value) => {
                self.number_range(key, kind, value)?
            }
            _ => return self.push_simple(p, "=", r),
        };
        r.sql.push_str(&self.with_null(predicate, key, clause)?);
        Ok(())
    }

    /// Unscoped taxon keys test every rank column; scoped ones the taxon
    /// key array of their classification.
    fn taxon_equals(
        &self,
        key: &SearchParameter,
        value: &str,
        scope: Option<&str>,
    ) -> Result<String, CompileError> {
        let levels = self.resolver.level_columns(key);
        if scope.is_none() && !levels.is_empty() {
            let literal = taxon_literal(value);
            let tests: Vec<String> = levels.iter().map(|c| format!("{c} = {literal}")).collect();
            return Ok(format!("({})", tests.join(" OR ")));
        }

        let column = self.scoped_column(key, scope)?;
        Ok(format!(
            "({}({column}, {}, true))",
            self.dialect.array_contains_fn(),
            quote(value)
        ))
    }

    /// `(lower >= start AND upper < end)` over the calendar interval the
    /// value stands for. Either side is dropped for an open range, and a
    /// fully open range matches every row.
    fn date_equals(&self, key: &SearchParameter, value: &str) -> Result<String, CompileError> {
        let range = date::parse_date_range(value)
            .map_err(|e| CompileError::invalid_value(key.name(), value, e))?;
        let (lower_column, upper_column) = self.date_columns(key)?;
        let unit = self.resolver.date_unit(key);

        let mut bounds = Vec::new();
        if let Some(start) = range.lower() {
            bounds.push(format!("{lower_column} >= {}", unit.epoch(*start)));
        }
        if let Some(end) = range.upper() {
            bounds.push(format!("{upper_column} < {}", unit.epoch(*end)));
        }
        if bounds.is_empty() {
            return Ok(MATCH_ALL.to_string());
        }
        Ok(format!("({})", bounds.join(" AND ")))
    }

    /// Keys storing a numeric interval `(lower, upper]` per row. A single
    /// value matches intervals holding it, a range matches intervals lying
    /// within it.
    fn span_equals(&self, key: &SearchParameter, value: &str) -> Result<String, CompileError> {
        let (lower_column, upper_column) = self.span_columns(key)?;
        if !number::is_numeric_range(value) {
            let v = self.sql_value(key, value, true)?;
            return Ok(format!("({v} > {lower_column} AND {v} <= {upper_column})"));
        }

        let range = number::parse_decimal_range(value)
            .map_err(|e| CompileError::invalid_value(key.name(), value, e))?;
        let mut bounds = Vec::new();
        if let Some(v) = range.lower() {
            bounds.push(format!("{lower_column} >= {}", number::format_decimal(*v)));
        }
        if let Some(v) = range.upper() {
            bounds.push(format!("{upper_column} <= {}", number::format_decimal(*v)));
        }
        Ok(match bounds.len() {
            0 => MATCH_ALL.to_string(),
            1 => bounds.remove(0),
            _ => format!("({})", bounds.join(" AND ")),
        })
    }

    /// Comparisons against a stored numeric interval match when some value
    /// of the interval satisfies them.
    fn span_comparison(
        &self,
        key: &SearchParameter,
        value: &str,
        comparison: Comparison,
    ) -> Result<String, CompileError> {
        let (lower_column, upper_column) = self.span_columns(key)?;
        let v = self.range_bound(key, value)?;
        Ok(match comparison {
            Comparison::GreaterThanOrEquals => format!("{upper_column} >= {v}"),
            Comparison::GreaterThan => format!("{upper_column} > {v}"),
            Comparison::LessThanOrEquals | Comparison::LessThan => {
                format!("{lower_column} < {v}")
            }
        })
    }

    fn number_range(
        &self,
        key: &SearchParameter,
        kind: NumberKind,
        value: &str,
    ) -> Result<String, CompileError> {
        let invalid = |e| CompileError::invalid_value(key.name(), value, e);
        let (lower, upper) = match kind {
            NumberKind::Integer => {
                let range = number::parse_integer_range(value).map_err(invalid)?;
                (
                    range.lower().map(i64::to_string),
                    range.upper().map(i64::to_string),
                )
            }
            NumberKind::Decimal => {
                let range = number::parse_decimal_range(value).map_err(invalid)?;
                (
                    range.lower().map(|v| number::format_decimal(*v)),
                    range.upper().map(|v| number::format_decimal(*v)),
                )
            }
        };

        let column = self.column(key, false)?;
        let mut bounds = Vec::new();
        if let Some(v) = lower {
            bounds.push(format!("{column} >= {v}"));
        }
        if let Some(v) = upper {
            bounds.push(format!("{column} <= {v}"));
        }
        Ok(conjoin(bounds))
    }

    fn visit_comparison(
        &self,
        predicate: &Predicate,
        p: &SimplePredicate,
        comparison: Comparison,
        r: &mut Renderer,
    ) -> Result<(), CompileError> {
        let key = p.key();
        let clause = self.comparison(key, p.value(), comparison)?;
        r.sql.push_str(&self.with_null(predicate, key, clause)?);
        Ok(())
    }

    fn comparison(
        &self,
        key: &SearchParameter,
        value: &str,
        comparison: Comparison,
    ) -> Result<String, CompileError> {
        if self.resolver.is_numeric_interval(key) {
            return self.span_comparison(key, value, comparison);
        }
        match self.resolver.value_type(key) {
            ValueType::Date | ValueType::Interval => self.date_comparison(key, value, comparison),
            _ => self.simple(key, comparison.symbol(), value, false),
        }
    }

    /// A partial date stands for a whole calendar interval. `>=` and `<=`
    /// include it, `>` and `<` exclude it. Lower-bound tests use the upper
    /// column of an interval key and vice versa, so overlapping intervals
    /// match.
    fn date_comparison(
        &self,
        key: &SearchParameter,
        value: &str,
        comparison: Comparison,
    ) -> Result<String, CompileError> {
        let (start, end) = date::calendar_interval(value)
            .map_err(|e| CompileError::invalid_value(key.name(), value, e))?;
        let (lower_column, upper_column) = self.date_columns(key)?;
        let unit = self.resolver.date_unit(key);

        Ok(match comparison {
            Comparison::GreaterThanOrEquals => format!("{upper_column} >= {}", unit.epoch(start)),
            Comparison::GreaterThan => format!("{upper_column} >= {}", unit.epoch(end)),
            Comparison::LessThanOrEquals => format!("{lower_column} < {}", unit.epoch(end)),
            Comparison::LessThan => format!("{lower_column} < {}", unit.epoch(start)),
        })
    }

    /// `(clause OR column IS NULL)` when the resolver asks for rows without
    /// a value to match too.
    fn with_null(
        &self,
        predicate: &Predicate,
        key: &SearchParameter,
        clause: String,
    ) -> Result<String, CompileError> {
        if !self.resolver.include_null_in_predicate(predicate) {
            return Ok(clause);
        }
        let column = self.column(key, true)?;
        Ok(format!("({clause} OR {column} IS NULL)"))
    }

    fn visit_like(&self, p: &SimplePredicate, r: &mut Renderer) -> Result<(), CompileError> {
        let key = p.key();
        // a pattern cannot be spread over several columns
        if !self.resolver.level_columns(key).is_empty() {
            return Err(CompileError::UnsupportedPredicate(format!(
                "like on multi-column parameter {}",
                key.name()
            )));
        }
        if self.resolver.is_array(key) {
            let column = self.column(key, false)?;
            r.push_array_like(&column, p.value(), p.match_case());
            return Ok(());
        }
        let mut literal = quote_pattern(&like_pattern(p.value()));
        if self.folds_case(key, p.match_case()) {
            literal = lower(&literal);
        }
        r.sql.push_str(&format!(
            "{} LIKE {literal}",
            self.sql_field(key, p.match_case())?
        ));
        Ok(())
    }

    fn visit_in(&self, p: &InPredicate, r: &mut Renderer) -> Result<(), CompileError> {
        let key = p.key();

        if self.resolver.is_taxonomic(key) {
            let levels = self.resolver.level_columns(key);
            if p.scope().is_none() && !levels.is_empty() {
                let literals = join_literals(p.values().iter().map(|v| quote(v)));
                r.sql.push('(');
                r.push_joined(levels.iter().map(|c| format!("{c} IN({literals})")), " OR ");
                r.sql.push(')');
                return Ok(());
            }
            return self.visit_members(p, r);
        }

        let levels = self.resolver.level_columns(key);
        if !levels.is_empty() {
            let literals = join_literals(p.values().iter().map(|v| quote(&v.to_uppercase())));
            r.sql.push('(');
            r.push_joined(levels.iter().map(|c| format!("{c} IN({literals})")), " OR ");
            r.sql.push(')');
            return Ok(());
        }

        let per_value = match self.resolver.value_type(key) {
            _ if self.resolver.is_numeric_interval(key) => true,
            ValueType::Date | ValueType::Interval => true,
            ValueType::Number(_) => p.values().iter().any(|v| number::is_numeric_range(v)),
            _ => false,
        };
        if per_value || self.is_array_like(key) {
            return self.visit_members(p, r);
        }

        let values = p
            .values()
            .iter()
            .map(|v| self.sql_value(key, v, p.match_case()))
            .collect::<Result<Vec<_>, _>>()?;
        r.sql.push('(');
        r.sql.push_str(&self.sql_field(key, p.match_case())?);
        r.sql.push_str(" IN(");
        r.push_joined(&values, ", ");
        r.sql.push(')');

        if self.resolver.is_denormalized(key) {
            let legacy = self.legacy_column(key)?;
            let tests = p
                .values()
                .iter()
                .map(|v| Ok(format!("(array_contains({legacy},{}))", self.sql_value(key, v, true)?)))
                .collect::<Result<Vec<_>, CompileError>>()?;
            r.sql.push_str(" OR (");
            r.push_joined(&tests, " OR ");
            r.sql.push(')');
        }
        r.sql.push(')');
        Ok(())
    }

    /// `(member OR member ...)`, compiling each value as an equality.
    fn visit_members(&self, p: &InPredicate, r: &mut Renderer) -> Result<(), CompileError> {
        let mut members = Vec::with_capacity(p.values().len());
        for value in p.values() {
            let member = p.member(value);
            let mut sub = r.fork();
            self.visit_equals(&Predicate::Equals(member.clone()), &member, &mut sub)?;
            members.push(sub.finish());
        }
        r.sql.push('(');
        r.push_joined(&members, " OR ");
        r.sql.push(')');
        Ok(())
    }

    fn visit_range(&self, p: &RangePredicate, r: &mut Renderer) -> Result<(), CompileError> {
        let key = p.key();
        let value = p.value();
        let bounds = [
            (&value.gte, Comparison::GreaterThanOrEquals),
            (&value.gt, Comparison::GreaterThan),
            (&value.lte, Comparison::LessThanOrEquals),
            (&value.lt, Comparison::LessThan),
        ];

        let mut tests = Vec::new();
        for (bound, comparison) in bounds {
            let Some(raw) = bound else {
                continue;
            };
            let test = if self.resolver.is_numeric_interval(key)
                || self.resolver.value_type(key).is_date_like()
            {
                self.comparison(key, raw, comparison)?
            } else {
                format!(
                    "{} {} {}",
                    self.column(key, false)?,
                    comparison.symbol(),
                    self.range_bound(key, raw)?
                )
            };
            tests.push(test);
        }
        r.sql.push_str(&conjoin(tests));
        Ok(())
    }

    /// A range bound re-rendered from its parsed number.
    fn range_bound(&self, key: &SearchParameter, raw: &str) -> Result<String, CompileError> {
        let invalid = |e: std::num::ParseIntError| CompileError::invalid_value(key.name(), raw, e);
        match self.resolver.value_type(key) {
            ValueType::Number(NumberKind::Integer) => {
                Ok(raw.trim().parse::<i64>().map_err(invalid)?.to_string())
            }
            ValueType::Number(NumberKind::Decimal) => raw
                .trim()
                .parse::<f64>()
                .map(number::format_decimal)
                .map_err(|e| CompileError::invalid_value(key.name(), raw, e)),
            _ => self.sql_value(key, raw, true),
        }
    }

    fn visit_null_check(&self, p: &NullCheck, present: bool, r: &mut Renderer) -> Result<(), CompileError> {
        let key = p.key();
        let test = if present { "IS NOT NULL" } else { "IS NULL" };

        let levels = self.resolver.level_columns(key);
        let scoped = self.resolver.is_taxonomic(key) && (p.scope().is_some() || levels.is_empty());
        if !levels.is_empty() && !scoped {
            r.sql.push('(');
            r.push_joined(levels.iter().map(|c| format!("{c} {test}")), " AND ");
            r.sql.push(')');
            return Ok(());
        }

        if self.resolver.is_numeric_interval(key) || self.resolver.value_type(key) == ValueType::Interval {
            let (lower_column, upper_column) = self.span_columns(key)?;
            r.sql
                .push_str(&format!("({lower_column} {test} AND {upper_column} {test})"));
            return Ok(());
        }

        let column = if scoped {
            self.scoped_column(key, p.scope())?
        } else {
            self.column(key, true)?
        };
        let array = scoped || self.resolver.is_array(key);
        match (present, array || self.resolver.is_vocabulary(key)) {
            (true, true) => r
                .sql
                .push_str(&format!("({column} IS NOT NULL AND size({column}) > 0)")),
            (false, _) if array => r
                .sql
                .push_str(&format!("({column} IS NULL OR size({column}) = 0)")),
            _ => r.sql.push_str(&format!("{column} {test}")),
        }
        Ok(())
    }

    fn push_simple(&self, p: &SimplePredicate, op: &str, r: &mut Renderer) -> Result<(), CompileError> {
        r.sql
            .push_str(&self.simple(p.key(), op, p.value(), p.match_case())?);
        Ok(())
    }

    /// `field op value`, case-folding both sides of string comparisons.
    fn simple(
        &self,
        key: &SearchParameter,
        op: &str,
        value: &str,
        match_case: bool,
    ) -> Result<String, CompileError> {
        Ok(format!(
            "{} {op} {}",
            self.sql_field(key, match_case)?,
            self.sql_value(key, value, match_case)?
        ))
    }

    fn sql_field(&self, key: &SearchParameter, match_case: bool) -> Result<String, CompileError> {
        let column = self.column(key, match_case)?;
        if self.folds_case(key, match_case) {
            return Ok(lower(&column));
        }
        Ok(column)
    }

    /// A value as a SQL literal: enums upper-cased and quoted, dates as
    /// epoch numbers, numbers and booleans bare, strings quoted.
    fn sql_value(&self, key: &SearchParameter, value: &str, match_case: bool) -> Result<String, CompileError> {
        let literal = match self.resolver.value_type(key) {
            ValueType::Enum => quote(&value.to_uppercase()),
            ValueType::Date | ValueType::Interval => {
                let day = date::parse_date(value)
                    .map_err(|e| CompileError::invalid_value(key.name(), value, e))?;
                self.resolver.date_unit(key).epoch(day).to_string()
            }
            ValueType::Number(_) => value.trim().to_string(),
            ValueType::Boolean => value.trim().to_lowercase(),
            ValueType::String | ValueType::Geometry => {
                let quoted = quote(value);
                if self.folds_case(key, match_case) {
                    lower(&quoted)
                } else {
                    quoted
                }
            }
        };
        Ok(literal)
    }

    fn folds_case(&self, key: &SearchParameter, match_case: bool) -> bool {
        !match_case && self.resolver.value_type(key) == ValueType::String
    }

    fn is_array_like(&self, key: &SearchParameter) -> bool {
        self.resolver.is_array(key) || self.resolver.is_vocabulary(key)
    }

    fn column(&self, key: &SearchParameter, match_case: bool) -> Result<String, CompileError> {
        self.resolver
            .field_name(key, match_case)
            .ok_or_else(|| CompileError::UnmappedParameter(key.name().to_string()))
    }

    fn scoped_column(&self, key: &SearchParameter, scope: Option<&str>) -> Result<String, CompileError> {
        let tag = scope.unwrap_or_else(|| self.resolver.default_scope_tag());
        self.resolver
            .scoped_column(key, tag)
            .ok_or_else(|| CompileError::UnmappedParameter(key.name().to_string()))
    }

    fn legacy_column(&self, key: &SearchParameter) -> Result<String, CompileError> {
        self.resolver
            .denormalized_column(key)
            .ok_or_else(|| CompileError::UnmappedParameter(key.name().to_string()))
    }

    /// Lower and upper bound columns; a plain date key uses one column for
    /// both.
    fn date_columns(&self, key: &SearchParameter) -> Result<(String, String), CompileError> {
        if self.resolver.value_type(key) == ValueType::Interval {
            return self.span_columns(key);
        }
        let column = self.column(key, false)?;
        Ok((column.clone(), column))
    }

    fn span_columns(&self, key: &SearchParameter) -> Result<(String, String), CompileError> {
        self.resolver
            .interval_columns(key)
            .ok_or_else(|| CompileError::UnmappedParameter(key.name().to_string()))
    }
}

/// A lone test stands bare; several are AND-ed in their own parentheses.
/// No test at all matches every row.
fn conjoin(tests: Vec<String>) -> String {
    match tests.len() {
        0 => MATCH_ALL.to_string(),
        1 => tests.into_iter().collect(),
        _ => {
            let wrapped: Vec<String> = tests.iter().map(|t| format!("({t})")).collect();
            format!("({})", wrapped.join(" AND "))
        }
    }
}

fn join_literals(literals: impl Iterator<Item = String>) -> String {
    literals.collect::<Vec<_>>().join(", ")
}

/// Numeric taxon keys are written bare to match the rank columns' type.
fn taxon_literal(value: &str) -> String {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        value.to_string()
    } else {
        quote(value)
    }
}

impl PredicateCompiler for SqlCompiler<'_> {
    type Output = String;

    fn compile(&self, predicate: Option<&Predicate>) -> Result<String, CompileError> {
        let Some(predicate) = predicate else {
            return Ok(MATCH_ALL.to_string());
        };
        check_depth(predicate, self.max_depth)?;
        debug!(
            kind = predicate.kind(),
            dialect = self.dialect.name(),
            "Compiling SQL where clause"
        );

        let mut r = Renderer::new(self.dialect);
        self.visit(predicate, &mut r)?;
        Ok(r.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dialect::Spark, resolver::DateUnit};
    use predicate_model::{FieldResolver, RangeValue};
    use tracing_test::traced_test;

    struct Columns;

    impl FieldResolver for Columns {
        fn field_name(&self, key: &SearchParameter, _match_case: bool) -> Option<String> {
            match key.name() {
                "UNMAPPED" => None,
                "LIFE_STAGE" => Some("lifestage.lineage".into()),
                name => Some(name.replace('_', "").to_lowercase()),
            }
        }

        fn is_array(&self, key: &SearchParameter) -> bool {
            matches!(key.name(), "ISSUE" | "RECORDED_BY")
        }

        fn is_vocabulary(&self, key: &SearchParameter) -> bool {
            key.name() == "LIFE_STAGE"
        }

        fn is_taxonomic(&self, key: &SearchParameter) -> bool {
            key.name() == "TAXON_KEY"
        }

        fn is_numeric_interval(&self, key: &SearchParameter) -> bool {
            key.name() == "GEOLOGICAL_TIME"
        }

        fn default_scope_tag(&self) -> &str {
            "backbone"
        }

        fn include_null_in_predicate(&self, predicate: &Predicate) -> bool {
            matches!(predicate, Predicate::GreaterThanOrEquals(p) if p.key().name() == "DISTANCE")
        }
    }

    impl SqlFieldResolver for Columns {
        fn latitude_column(&self) -> &str {
            "decimallatitude"
        }

        fn longitude_column(&self) -> &str {
            "decimallongitude"
        }

        fn level_columns(&self, key: &SearchParameter) -> Vec<String> {
            match key.name() {
                "TAXON_KEY" => vec!["taxonkey".into(), "kingdomkey".into()],
                _ => Vec::new(),
            }
        }

        fn scoped_column(&self, _key: &SearchParameter, tag: &str) -> Option<String> {
            Some(format!("classifications['{tag}']"))
        }

        fn interval_columns(&self, key: &SearchParameter) -> Option<(String, String)> {
            match key.name() {
                "GEOLOGICAL_TIME" => Some(("geologicaltime.gt".into(), "geologicaltime.lte".into())),
                _ => Some(("eventdategte".into(), "eventdatelte".into())),
            }
        }

        fn date_unit(&self, key: &SearchParameter) -> DateUnit {
            match key.value_type() {
                ValueType::Interval => DateUnit::Seconds,
                _ => DateUnit::Milliseconds,
            }
        }
    }

    fn key(name: &str, value_type: ValueType) -> SearchParameter {
        SearchParameter::new(name, value_type)
    }

    fn catalog() -> SearchParameter {
        key("CATALOG_NUMBER", ValueType::String)
    }

    fn year() -> SearchParameter {
        key("YEAR", ValueType::Number(NumberKind::Integer))
    }

    fn compile(p: &Predicate) -> String {
        SqlCompiler::new(&Columns).compile(Some(p)).unwrap()
    }

    #[test]
    fn test_missing_predicate_matches_all() {
        assert_eq!(SqlCompiler::new(&Columns).compile(None).unwrap(), "true");
    }

    #[test]
    fn test_equals_case_folding() {
        let p = Predicate::equals(&catalog(), "value", false).unwrap();
        assert_eq!(compile(&p), "lower(catalognumber) = lower('value')");
        let p = Predicate::equals(&catalog(), "value", true).unwrap();
        assert_eq!(compile(&p), "catalognumber = 'value'");
    }

    #[test]
    fn test_compound_parenthesizes_children() {
        let p = Predicate::and(vec![
            Predicate::equals(&catalog(), "a", true).unwrap(),
            Predicate::not(Predicate::equals(&year(), "2000", false).unwrap()),
        ])
        .unwrap();
        assert_eq!(compile(&p), "((catalognumber = 'a') AND (NOT year = 2000))");
    }

    #[traced_test]
    #[test]
    fn test_disjunction_folds_into_in() {
        let p = Predicate::or(vec![
            Predicate::equals(&catalog(), "value_1", false).unwrap(),
            Predicate::equals(&catalog(), "value_2", false).unwrap(),
        ])
        .unwrap();
        assert_eq!(
            compile(&p),
            "(lower(catalognumber) IN(lower('value_1'), lower('value_2')))"
        );
        assert!(logs_contain("Folding equalities into IN"));
    }

    #[test]
    fn test_mixed_case_disjunction_is_not_folded() {
        let p = Predicate::or(vec![
            Predicate::equals(&catalog(), "value_1", true).unwrap(),
            Predicate::equals(&catalog(), "value_2", false).unwrap(),
        ])
        .unwrap();
        assert_eq!(
            compile(&p),
            "((catalognumber = 'value_1') OR (lower(catalognumber) = lower('value_2')))"
        );
    }

    #[test]
    fn test_number_ranges() {
        let p = Predicate::equals(&year(), "1950,1960", false).unwrap();
        assert_eq!(compile(&p), "((year >= 1950) AND (year <= 1960))");
        let p = Predicate::equals(&year(), "*,2000", false).unwrap();
        assert_eq!(compile(&p), "year <= 2000");

        let elevation = key("ELEVATION", ValueType::Number(NumberKind::Decimal));
        let p = Predicate::equals(&elevation, "-200,600.2", false).unwrap();
        assert_eq!(compile(&p), "((elevation >= -200.0) AND (elevation <= 600.2))");
    }

    #[test]
    fn test_range_predicate() {
        let p = Predicate::range(&year(), RangeValue::new().gt("1990").lte("2011")).unwrap();
        assert_eq!(compile(&p), "((year > 1990) AND (year <= 2011))");
        let p = Predicate::range(&year(), RangeValue::new().gte("1990")).unwrap();
        assert_eq!(compile(&p), "year >= 1990");
    }

    #[test]
    fn test_interval_equals_and_comparisons() {
        let event_date = key("EVENT_DATE", ValueType::Interval);
        let p = Predicate::equals(&event_date, "2000-01-02", false).unwrap();
        assert_eq!(
            compile(&p),
            "(eventdategte >= 946771200 AND eventdatelte < 946857600)"
        );
        let p = Predicate::less_than_or_equals(&event_date, "2000").unwrap();
        assert_eq!(compile(&p), "eventdategte < 978307200");
        let p = Predicate::greater_than(&event_date, "2000").unwrap();
        assert_eq!(compile(&p), "eventdatelte >= 978307200");
    }

    #[test]
    fn test_open_date_range_matches_all() {
        let modified = key("LAST_INTERPRETED", ValueType::Date);
        let p = Predicate::equals(&modified, "*,*", false).unwrap();
        assert_eq!(compile(&p), "true");
        let p = Predicate::equals(&modified, "1940,*", false).unwrap();
        assert_eq!(compile(&p), "(lastinterpreted >= -946771200000)");
        let p = Predicate::equals(&year(), "*,*", false).unwrap();
        assert_eq!(compile(&p), "true");
    }

    #[test]
    fn test_open_range_inside_compounds_stays_well_formed() {
        let modified = key("LAST_INTERPRETED", ValueType::Date);
        let open = || Predicate::equals(&modified, "*,*", false).unwrap();
        let p = Predicate::and(vec![open(), Predicate::equals(&year(), "2000", false).unwrap()])
            .unwrap();
        assert_eq!(compile(&p), "((true) AND (year = 2000))");
        let p = Predicate::or(vec![open(), open()]).unwrap();
        assert_eq!(compile(&p), "((true) OR (true))");
        assert_eq!(compile(&Predicate::not(open())), "NOT true");
        let p = Predicate::not(Predicate::equals(&year(), "*,*", false).unwrap());
        assert_eq!(compile(&p), "NOT true");
    }

    #[test]
    fn test_backslash_cannot_end_a_literal() {
        let p = Predicate::equals(&catalog(), r"a\' OR 1=1 OR 'x", true).unwrap();
        assert_eq!(compile(&p), r"catalognumber = 'a\\\' OR 1=1 OR \'x'");
        let p = Predicate::like(&catalog(), r"a\' OR 1=1 OR 'x*", true).unwrap();
        assert_eq!(compile(&p), r"catalognumber LIKE 'a\\\\\' OR 1=1 OR \'x%'");
    }

    #[test]
    fn test_numeric_interval() {
        let geological_time = key("GEOLOGICAL_TIME", ValueType::Number(NumberKind::Decimal));
        let p = Predicate::equals(&geological_time, "12", false).unwrap();
        assert_eq!(
            compile(&p),
            "(12 > geologicaltime.gt AND 12 <= geologicaltime.lte)"
        );
        let p = Predicate::equals(&geological_time, "12,15", false).unwrap();
        assert_eq!(
            compile(&p),
            "(geologicaltime.gt >= 12.0 AND geologicaltime.lte <= 15.0)"
        );
        let p = Predicate::equals(&geological_time, "12,*", false).unwrap();
        assert_eq!(compile(&p), "geologicaltime.gt >= 12.0");
        let p = Predicate::equals(&geological_time, "*,15", false).unwrap();
        assert_eq!(compile(&p), "geologicaltime.lte <= 15.0");
        let p = Predicate::equals(&geological_time, "*,*", false).unwrap();
        assert_eq!(compile(&p), "true");

        let p = Predicate::greater_than_or_equals(&geological_time, "100").unwrap();
        assert_eq!(compile(&p), "geologicaltime.lte >= 100.0");
        let p = Predicate::range(&geological_time, RangeValue::new().gt("10").lt("20")).unwrap();
        assert_eq!(
            compile(&p),
            "((geologicaltime.lte > 10.0) AND (geologicaltime.gt < 20.0))"
        );
        let p = Predicate::is_null(&geological_time).unwrap();
        assert_eq!(
            compile(&p),
            "(geologicaltime.gt IS NULL AND geologicaltime.lte IS NULL)"
        );
    }

    #[test]
    fn test_numeric_interval_disjunction_is_not_folded() {
        let geological_time = key("GEOLOGICAL_TIME", ValueType::Number(NumberKind::Decimal));
        let p = Predicate::or(vec![
            Predicate::equals(&geological_time, "12", false).unwrap(),
            Predicate::equals(&geological_time, "30", false).unwrap(),
        ])
        .unwrap();
        assert_eq!(
            compile(&p),
            "(((12 > geologicaltime.gt AND 12 <= geologicaltime.lte)) OR \
             ((30 > geologicaltime.gt AND 30 <= geologicaltime.lte)))"
        );
        let p = Predicate::is_in(&geological_time, &["12", "30"], false).unwrap();
        assert_eq!(
            compile(&p),
            "((12 > geologicaltime.gt AND 12 <= geologicaltime.lte) OR \
             (30 > geologicaltime.gt AND 30 <= geologicaltime.lte))"
        );
    }

    #[test]
    fn test_taxon_key_expands_over_ranks() {
        let taxon = key("TAXON_KEY", ValueType::String);
        let p = Predicate::equals(&taxon, "212", false).unwrap();
        assert_eq!(compile(&p), "(taxonkey = 212 OR kingdomkey = 212)");
        let p = Predicate::is_in(&taxon, &["1", "2"], false).unwrap();
        assert_eq!(
            compile(&p),
            "(taxonkey IN('1', '2') OR kingdomkey IN('1', '2'))"
        );
        let p = Predicate::equals_in_scope(&taxon, "6", false, Some("col")).unwrap();
        assert_eq!(
            compile(&p),
            "(stringArrayContains(classifications['col'], '6', true))"
        );
        let p = Predicate::is_null(&taxon).unwrap();
        assert_eq!(compile(&p), "(taxonkey IS NULL AND kingdomkey IS NULL)");
    }

    #[test]
    fn test_arrays_and_vocabularies() {
        let issue = key("ISSUE", ValueType::Enum);
        let p = Predicate::equals(&issue, "zero_coordinate", false).unwrap();
        assert_eq!(compile(&p), "stringArrayContains(issue,'ZERO_COORDINATE',true)");
        let p = Predicate::is_null(&issue).unwrap();
        assert_eq!(compile(&p), "(issue IS NULL OR size(issue) = 0)");

        let recorded_by = key("RECORDED_BY", ValueType::String);
        let p = Predicate::like(&recorded_by, "v?l*ue_%", false).unwrap();
        assert_eq!(compile(&p), "stringArrayLike(recordedby,'v?l*ue_%',false)");

        let life_stage = key("LIFE_STAGE", ValueType::String);
        let p = Predicate::is_in(&life_stage, &["value_1", "value_2"], false).unwrap();
        assert_eq!(
            compile(&p),
            "(stringArrayContains(lifestage.lineage,'value_1',false) OR stringArrayContains(lifestage.lineage,'value_2',false))"
        );
        let p = Predicate::is_not_null(&life_stage).unwrap();
        assert_eq!(
            compile(&p),
            "(lifestage.lineage IS NOT NULL AND size(lifestage.lineage) > 0)"
        );
        let p = Predicate::is_null(&life_stage).unwrap();
        assert_eq!(compile(&p), "lifestage.lineage IS NULL");
    }

    #[test]
    fn test_spark_dialect() {
        let issue = key("ISSUE", ValueType::Enum);
        let p = Predicate::equals(&issue, "ZERO_COORDINATE", false).unwrap();
        let sql = SqlCompiler::new(&Columns)
            .with_dialect(&Spark)
            .compile(Some(&p))
            .unwrap();
        assert_eq!(sql, "array_contains(issue,'ZERO_COORDINATE',true)");
    }

    #[test]
    fn test_like_escapes_pattern() {
        let p = Predicate::like(&catalog(), "v?l*ue_%", false).unwrap();
        assert_eq!(compile(&p), r"lower(catalognumber) LIKE lower('v_l%ue\_\%')");
    }

    #[test]
    fn test_like_on_rank_columns_is_unsupported() {
        let taxon = key("TAXON_KEY", ValueType::String);
        let p = Predicate::like(&taxon, "21*", false).unwrap();
        assert!(matches!(
            SqlCompiler::new(&Columns).compile(Some(&p)),
            Err(CompileError::UnsupportedPredicate(_))
        ));
    }

    #[test]
    fn test_include_null() {
        let distance = key("DISTANCE", ValueType::Number(NumberKind::Integer));
        let p = Predicate::greater_than_or_equals(&distance, "10").unwrap();
        assert_eq!(compile(&p), "(distance >= 10 OR distance IS NULL)");
        let p = Predicate::greater_than(&distance, "10").unwrap();
        assert_eq!(compile(&p), "distance > 10");
    }

    #[test]
    fn test_geo_distance() {
        let p = Predicate::geo_distance("30", "10", "10km").unwrap();
        assert_eq!(
            compile(&p),
            "(geoDistance(30.0, 10.0, '10.0km', decimallatitude, decimallongitude) = TRUE)"
        );
    }

    #[test]
    fn test_unmapped_parameter() {
        let p = Predicate::equals(&key("UNMAPPED", ValueType::String), "x", false).unwrap();
        assert_eq!(
            SqlCompiler::new(&Columns).compile(Some(&p)),
            Err(CompileError::UnmappedParameter("UNMAPPED".into()))
        );
    }

    #[test]
    fn test_invalid_geometry_fails_compilation() {
        let p = Predicate::within("POLYGON((0 0, 1 1, 2 2, 0 0))");
        assert!(matches!(
            SqlCompiler::new(&Columns).compile(Some(&p)),
            Err(CompileError::Geometry(_))
        ));
    }
}
