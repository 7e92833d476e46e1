use crate::{
    DEFAULT_CHECKLIST_KEY,
    parameters::{ParameterSpec, Storage, spec},
};
use predicate_model::{FieldResolver, Predicate, SearchParameter};
use sql_compiler::{DateUnit, SqlFieldResolver, renderer::column_name};

/// Columns of the flattened occurrence table.
#[derive(Debug, Clone)]
pub struct OccurrenceSqlFields {
    default_checklist_key: String,
}

impl OccurrenceSqlFields {
    pub fn new() -> Self {
        Self::with_default_checklist(DEFAULT_CHECKLIST_KEY)
    }

    pub fn with_default_checklist(key: impl Into<String>) -> Self {
        Self {
            default_checklist_key: key.into(),
        }
    }
}

impl Default for OccurrenceSqlFields {
    fn default() -> Self {
        Self::new()
    }
}

fn storage(key: &SearchParameter) -> Option<Storage> {
    spec(key.name()).map(|s| s.storage)
}

fn map_key(key: &SearchParameter) -> Option<&'static ParameterSpec> {
    spec(key.name())
}

impl FieldResolver for OccurrenceSqlFields {
    /// Case is folded with `lower()` in the query, so both variants address
    /// the same column. Reserved words carry a trailing `_`.
    fn field_name(&self, key: &SearchParameter, _match_case: bool) -> Option<String> {
        let spec = map_key(key)?;
        let column = match spec.storage {
            Storage::Vocabulary => format!("{}.lineage", column_name(spec.column)),
            _ => column_name(spec.column),
        };
        Some(column)
    }

    fn is_vocabulary(&self, key: &SearchParameter) -> bool {
        storage(key) == Some(Storage::Vocabulary)
    }

    fn is_array(&self, key: &SearchParameter) -> bool {
        storage(key) == Some(Storage::Array)
    }

    /// Only keys stored per rank or per classification expand; single rank
    /// keys are plain columns here.
    fn is_taxonomic(&self, key: &SearchParameter) -> bool {
        map_key(key).is_some_and(|s| {
            s.taxonomic && matches!(s.storage, Storage::Levels(_) | Storage::Scoped(_))
        })
    }

    fn is_denormalized(&self, key: &SearchParameter) -> bool {
        matches!(storage(key), Some(Storage::Denormalized(_)))
    }

    fn is_numeric_interval(&self, key: &SearchParameter) -> bool {
        map_key(key).is_some_and(ParameterSpec::is_numeric_interval)
    }

    fn default_scope_tag(&self) -> &str {
        &self.default_checklist_key
    }

    fn include_null_in_predicate(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::GreaterThan(p) | Predicate::GreaterThanOrEquals(p) => {
                p.key().name() == "DISTANCE_FROM_CENTROID_IN_METERS"
            }
            _ => false,
        }
    }
}

impl SqlFieldResolver for OccurrenceSqlFields {
    fn latitude_column(&self) -> &str {
        "decimallatitude"
    }

    fn longitude_column(&self) -> &str {
        "decimallongitude"
    }

    fn level_columns(&self, key: &SearchParameter) -> Vec<String> {
        match storage(key) {
            Some(Storage::Levels(columns)) => columns.iter().map(|c| c.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    fn scoped_column(&self, key: &SearchParameter, tag: &str) -> Option<String> {
        let spec = map_key(key)?;
        let tag = tag.replace('\'', "\\'");
        let column = match spec.storage {
            Storage::Scoped(suffix) => format!("{}['{tag}']{suffix}", spec.column),
            _ => format!("classifications['{tag}']"),
        };
        Some(column)
    }

    fn interval_columns(&self, key: &SearchParameter) -> Option<(String, String)> {
        match storage(key)? {
            Storage::Interval(lower, upper) => Some((lower.to_string(), upper.to_string())),
            _ => None,
        }
    }

    fn date_unit(&self, key: &SearchParameter) -> DateUnit {
        map_key(key).map(|s| s.date_unit).unwrap_or_default()
    }

    fn denormalized_column(&self, key: &SearchParameter) -> Option<String> {
        match storage(key)? {
            Storage::Denormalized(column) => Some(column.to_string()),
            _ => None,
        }
    }
}
