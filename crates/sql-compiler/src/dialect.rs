//! Defines the `Dialect` trait for engine-specific function names.

use predicate_model::SqlDialectKind;

pub trait Dialect: Send + Sync {
    /// Array membership UDF, called as `fn(column,'value',match_case)`.
    ///
    /// - Hive uses `stringArrayContains`
    /// - Spark uses `array_contains`
    fn array_contains_fn(&self) -> &'static str;

    /// Array pattern UDF, called as `fn(column,'pattern',match_case)`.
    fn array_like_fn(&self) -> &'static str {
        "stringArrayLike"
    }

    /// Returns the name of the dialect (e.g., "Hive", "Spark").
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
pub struct Hive;

impl Dialect for Hive {
    fn array_contains_fn(&self) -> &'static str {
        "stringArrayContains"
    }

    fn name(&self) -> &'static str {
        "Hive"
    }
}

#[derive(Debug, Clone)]
pub struct Spark;

impl Dialect for Spark {
    fn array_contains_fn(&self) -> &'static str {
        "array_contains"
    }

    fn name(&self) -> &'static str {
        "Spark"
    }
}

pub fn dialect_for(kind: SqlDialectKind) -> &'static dyn Dialect {
    match kind {
        SqlDialectKind::Hive => &Hive,
        SqlDialectKind::Spark => &Spark,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_for() {
        assert_eq!(dialect_for(SqlDialectKind::Hive).array_contains_fn(), "stringArrayContains");
        assert_eq!(dialect_for(SqlDialectKind::Spark).array_contains_fn(), "array_contains");
        assert_eq!(dialect_for(SqlDialectKind::Spark).array_like_fn(), "stringArrayLike");
    }
}
