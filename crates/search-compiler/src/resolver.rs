use predicate_model::{FieldResolver, SearchParameter};

/// Field addressing for the search index.
///
/// [`FieldResolver::field_name`] returns the case-folded keyword field, or
/// the verbatim field when `match_case` is set.
pub trait SearchFieldResolver: FieldResolver {
    /// Geo-point field used for distance queries.
    fn geo_point_field(&self) -> &str;

    /// Geo-shape field used for containment queries.
    fn geo_shape_field(&self) -> &str;

    /// Field holding a taxonomic key within the classification `tag`.
    fn scoped_field(&self, key: &SearchParameter, tag: &str) -> Option<String>;

    /// Nested object path the key lives under, if any.
    fn nested_path(&self, _key: &SearchParameter) -> Option<&str> {
        None
    }
}
