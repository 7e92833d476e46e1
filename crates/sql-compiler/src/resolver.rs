use chrono::NaiveDate;
use predicate_model::{FieldResolver, SearchParameter, range::date};

/// How a date column stores its instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateUnit {
    Seconds,
    #[default]
    Milliseconds,
}

impl DateUnit {
    /// Epoch value of UTC midnight at the start of `day`.
    pub fn epoch(self, day: NaiveDate) -> i64 {
        match self {
            DateUnit::Seconds => date::epoch_seconds(day),
            DateUnit::Milliseconds => date::epoch_millis(day),
        }
    }
}

/// Column addressing for the SQL tables.
///
/// [`FieldResolver::field_name`] returns the column for single-column keys.
/// Vocabulary keys should resolve to their concept lineage column.
pub trait SqlFieldResolver: FieldResolver {
    fn latitude_column(&self) -> &str;

    fn longitude_column(&self) -> &str;

    /// Every column a multi-level key expands to: the rank columns of a
    /// taxonomic key, or the level columns of an administrative area key.
    /// Empty for ordinary keys.
    fn level_columns(&self, _key: &SearchParameter) -> Vec<String> {
        Vec::new()
    }

    /// Array column holding the taxon keys of classification `tag`.
    fn scoped_column(&self, key: &SearchParameter, tag: &str) -> Option<String>;

    /// `(lower, upper)` bound columns of an interval-typed key.
    fn interval_columns(&self, _key: &SearchParameter) -> Option<(String, String)> {
        None
    }

    fn date_unit(&self, _key: &SearchParameter) -> DateUnit {
        DateUnit::Milliseconds
    }

    /// Legacy array column duplicating a denormalized key.
    fn denormalized_column(&self, _key: &SearchParameter) -> Option<String> {
        None
    }
}
