//! The seam between compilers and a deployment's storage layout.

use crate::{
    parameter::{SearchParameter, ValueType},
    predicate::Predicate,
};

/// Maps search parameters to physical fields and exposes the facts both
/// compilers branch on. Backends extend it with their own addressing
/// (search fields, SQL columns).
///
/// Implementations are read-only lookup tables and must be safe to share
/// between concurrent compilations.
pub trait FieldResolver: Send + Sync {
    /// Physical field for an exact match, choosing the verbatim variant when
    /// `match_case` is set. `None` means the key is not mapped.
    fn field_name(&self, key: &SearchParameter, match_case: bool) -> Option<String>;

    fn value_type(&self, key: &SearchParameter) -> ValueType {
        key.value_type()
    }

    /// Values come from a controlled vocabulary with concept lineage.
    fn is_vocabulary(&self, _key: &SearchParameter) -> bool {
        false
    }

    /// The field holds several values per record.
    fn is_array(&self, _key: &SearchParameter) -> bool {
        false
    }

    /// A taxon key matched against every rank of a classification.
    fn is_taxonomic(&self, _key: &SearchParameter) -> bool {
        false
    }

    /// The value is also stored in a legacy location.
    fn is_denormalized(&self, _key: &SearchParameter) -> bool {
        false
    }

    /// The field stores a numeric interval per record (a geological age
    /// span, say). A single value matches intervals holding it; a range
    /// matches intervals lying within it.
    fn is_numeric_interval(&self, _key: &SearchParameter) -> bool {
        false
    }

    /// Classification used when a predicate carries no scope tag.
    fn default_scope_tag(&self) -> &str;

    /// Whether a lower-bound comparison should also accept records that
    /// have no value for the key.
    fn include_null_in_predicate(&self, _predicate: &Predicate) -> bool {
        false
    }
}
