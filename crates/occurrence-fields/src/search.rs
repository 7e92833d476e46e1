use crate::{
    DEFAULT_CHECKLIST_KEY,
    parameters::{ParameterSpec, Storage, spec},
};
use predicate_model::{FieldResolver, Predicate, SearchParameter, ValueType};
use search_compiler::SearchFieldResolver;

const HUMBOLDT_PATH: &str = "event.humboldt";

/// Field names in the occurrence search index.
///
/// String fields are indexed twice: `<name>.keyword` case-folded and
/// `<name>.verbatim` as written. Humboldt fields live in nested
/// `event.humboldt` objects.
#[derive(Debug, Clone)]
pub struct OccurrenceSearchFields {
    default_checklist_key: String,
}

impl OccurrenceSearchFields {
    pub fn new() -> Self {
        Self::with_default_checklist(DEFAULT_CHECKLIST_KEY)
    }

    pub fn with_default_checklist(key: impl Into<String>) -> Self {
        Self {
            default_checklist_key: key.into(),
        }
    }
}

impl Default for OccurrenceSearchFields {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldResolver for OccurrenceSearchFields {
    fn field_name(&self, key: &SearchParameter, match_case: bool) -> Option<String> {
        let spec = spec(key.name())?;
        let base = match spec.name.strip_prefix("HUMBOLDT_") {
            Some(rest) => format!("{HUMBOLDT_PATH}.{}", rest.to_lowercase()),
            None => spec.name.to_lowercase(),
        };
        let field = match (spec.value_type, match_case) {
            (ValueType::String, false) => format!("{base}.keyword"),
            (ValueType::String, true) => format!("{base}.verbatim"),
            _ => base,
        };
        Some(field)
    }

    fn is_vocabulary(&self, key: &SearchParameter) -> bool {
        spec(key.name()).is_some_and(|s| s.storage == Storage::Vocabulary)
    }

    fn is_array(&self, key: &SearchParameter) -> bool {
        spec(key.name()).is_some_and(|s| s.storage == Storage::Array)
    }

    fn is_taxonomic(&self, key: &SearchParameter) -> bool {
        spec(key.name()).is_some_and(|s| s.taxonomic)
    }

    fn is_numeric_interval(&self, key: &SearchParameter) -> bool {
        spec(key.name()).is_some_and(ParameterSpec::is_numeric_interval)
    }

    fn default_scope_tag(&self) -> &str {
        &self.default_checklist_key
    }

    /// The distance to a centroid is only computed near one, so a minimum
    /// distance also matches records without a value.
    fn include_null_in_predicate(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::GreaterThan(p) | Predicate::GreaterThanOrEquals(p) => {
                p.key().name() == "DISTANCE_FROM_CENTROID_IN_METERS"
            }
            _ => false,
        }
    }
}

impl SearchFieldResolver for OccurrenceSearchFields {
    fn geo_point_field(&self) -> &str {
        "coordinates"
    }

    fn geo_shape_field(&self) -> &str {
        "scoordinates"
    }

    fn scoped_field(&self, key: &SearchParameter, tag: &str) -> Option<String> {
        let field = match key.name() {
            "SCIENTIFIC_NAME" => format!("classifications.{tag}.usage.name"),
            "HUMBOLDT_TARGET_TAXONOMIC_SCOPE_USAGE_KEY" => {
                format!("event.humboldt.targetTaxonomicScope.{tag}.usageKey")
            }
            "HUMBOLDT_TARGET_TAXONOMIC_SCOPE_TAXON_KEY" => {
                format!("event.humboldt.targetTaxonomicScope.{tag}.taxonKeys")
            }
            _ => format!("classifications.{tag}.taxonKeys"),
        };
        Some(field)
    }

    fn nested_path(&self, key: &SearchParameter) -> Option<&str> {
        key.name().starts_with("HUMBOLDT_").then_some(HUMBOLDT_PATH)
    }
}
