use lazy_static::lazy_static;
use predicate_model::{NumberKind, ParameterRegistry, SearchParameter, ValueType};
use sql_compiler::DateUnit;
use std::collections::HashMap;

/// How the occurrence table stores a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Column,
    /// Multi-valued column.
    Array,
    /// Controlled vocabulary struct; queries address its lineage array.
    Vocabulary,
    /// One column per level (taxon ranks, administrative levels).
    Levels(&'static [&'static str]),
    /// Per-classification array, `<column>['<tag>']<suffix>`.
    Scoped(&'static str),
    /// Lower and upper bound columns. Dates are stored `[lower, upper)`,
    /// numbers `(lower, upper]`.
    Interval(&'static str, &'static str),
    /// Column plus a legacy array duplicate.
    Denormalized(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub value_type: ValueType,
    pub column: &'static str,
    pub storage: Storage,
    pub taxonomic: bool,
    pub date_unit: DateUnit,
}

impl ParameterSpec {
    const fn new(name: &'static str, value_type: ValueType, column: &'static str) -> Self {
        Self {
            name,
            value_type,
            column,
            storage: Storage::Column,
            taxonomic: false,
            date_unit: DateUnit::Milliseconds,
        }
    }

    const fn stored(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    const fn taxonomic(mut self) -> Self {
        self.taxonomic = true;
        self
    }

    const fn in_seconds(mut self) -> Self {
        self.date_unit = DateUnit::Seconds;
        self
    }

    /// A number stored as a pair of bound columns.
    pub fn is_numeric_interval(&self) -> bool {
        matches!(self.storage, Storage::Interval(..)) && self.value_type.is_number()
    }
}

const INTEGER: ValueType = ValueType::Number(NumberKind::Integer);
const DECIMAL: ValueType = ValueType::Number(NumberKind::Decimal);

const TAXON_RANK_COLUMNS: &[&str] = &[
    "taxonkey",
    "acceptedtaxonkey",
    "kingdomkey",
    "phylumkey",
    "classkey",
    "orderkey",
    "familykey",
    "genuskey",
    "specieskey",
];

const GADM_LEVEL_COLUMNS: &[&str] = &["level0gid", "level1gid", "level2gid", "level3gid"];

const SPECS: &[ParameterSpec] = &[
    ParameterSpec::new("CATALOG_NUMBER", ValueType::String, "catalognumber"),
    ParameterSpec::new("INSTITUTION_CODE", ValueType::String, "institutioncode"),
    ParameterSpec::new("COLLECTION_CODE", ValueType::String, "collectioncode"),
    ParameterSpec::new("SCIENTIFIC_NAME", ValueType::String, "scientificname").taxonomic(),
    ParameterSpec::new("TAXON_KEY", ValueType::String, "taxonkey")
        .stored(Storage::Levels(TAXON_RANK_COLUMNS))
        .taxonomic(),
    ParameterSpec::new("KINGDOM_KEY", ValueType::String, "kingdomkey").taxonomic(),
    ParameterSpec::new("SPECIES_KEY", ValueType::String, "specieskey").taxonomic(),
    ParameterSpec::new("GADM_GID", ValueType::String, "gadmgid")
        .stored(Storage::Levels(GADM_LEVEL_COLUMNS)),
    ParameterSpec::new("RECORDED_BY", ValueType::String, "recordedby").stored(Storage::Array),
    ParameterSpec::new("IDENTIFIED_BY_ID", ValueType::String, "identifiedbyid")
        .stored(Storage::Array),
    ParameterSpec::new("MEDIA_TYPE", ValueType::Enum, "mediatype").stored(Storage::Array),
    ParameterSpec::new("ISSUE", ValueType::Enum, "issue").stored(Storage::Array),
    ParameterSpec::new("LIFE_STAGE", ValueType::String, "lifestage").stored(Storage::Vocabulary),
    ParameterSpec::new("ESTABLISHMENT_MEANS", ValueType::String, "establishmentmeans")
        .stored(Storage::Vocabulary),
    ParameterSpec::new("EVENT_ID", ValueType::String, "eventid")
        .stored(Storage::Denormalized("parents.eventid")),
    ParameterSpec::new("ELEVATION", DECIMAL, "elevation"),
    ParameterSpec::new("DEPTH", DECIMAL, "depth"),
    ParameterSpec::new("DISTANCE_FROM_CENTROID_IN_METERS", DECIMAL, "distancefromcentroidinmeters"),
    ParameterSpec::new("YEAR", INTEGER, "year"),
    ParameterSpec::new("MONTH", INTEGER, "month"),
    ParameterSpec::new("LAST_INTERPRETED", ValueType::Date, "lastinterpreted"),
    ParameterSpec::new("MODIFIED", ValueType::Date, "modified").in_seconds(),
    ParameterSpec::new("EVENT_DATE", ValueType::Interval, "eventdate")
        .stored(Storage::Interval("eventdategte", "eventdatelte"))
        .in_seconds(),
    ParameterSpec::new("GEOLOGICAL_TIME", DECIMAL, "geologicaltime")
        .stored(Storage::Interval("geologicaltime.gt", "geologicaltime.lte")),
    ParameterSpec::new("GROUP", ValueType::String, "group"),
    ParameterSpec::new("COUNTRY", ValueType::Enum, "countrycode"),
    ParameterSpec::new("BASIS_OF_RECORD", ValueType::Enum, "basisofrecord"),
    ParameterSpec::new("HAS_COORDINATE", ValueType::Boolean, "hascoordinate"),
    ParameterSpec::new("HAS_GEOSPATIAL_ISSUE", ValueType::Boolean, "hasgeospatialissues"),
    ParameterSpec::new("GEOMETRY", ValueType::Geometry, "geometry"),
    ParameterSpec::new("HUMBOLDT_SITE_COUNT", INTEGER, "h.sitecount"),
    ParameterSpec::new(
        "HUMBOLDT_EVENT_DURATION_VALUE_IN_MINUTES",
        DECIMAL,
        "h.humboldteventdurationvalueinminutes",
    ),
    ParameterSpec::new("HUMBOLDT_VERBATIM_SITE_NAMES", ValueType::String, "h.verbatimsitenames"),
    ParameterSpec::new("HUMBOLDT_IS_ABSENCE_REPORTED", ValueType::Boolean, "h.isabsencereported"),
    ParameterSpec::new(
        "HUMBOLDT_TARGET_TAXONOMIC_SCOPE_TAXON_KEY",
        ValueType::String,
        "humboldttargettaxonclassifications",
    )
    .stored(Storage::Scoped("['taxonkeys']"))
    .taxonomic(),
    ParameterSpec::new(
        "HUMBOLDT_TARGET_TAXONOMIC_SCOPE_USAGE_KEY",
        ValueType::String,
        "humboldttargettaxonclassifications",
    )
    .stored(Storage::Scoped("['usagekey']"))
    .taxonomic(),
];

lazy_static! {
    static ref SPEC_INDEX: HashMap<&'static str, &'static ParameterSpec> =
        SPECS.iter().map(|spec| (spec.name, spec)).collect();
    static ref PARAMETERS: HashMap<&'static str, SearchParameter> = SPECS
        .iter()
        .map(|spec| (spec.name, SearchParameter::new(spec.name, spec.value_type)))
        .collect();
}

/// Storage facts of a parameter, by name.
pub fn spec(name: &str) -> Option<&'static ParameterSpec> {
    SPEC_INDEX.get(name).copied()
}

/// The search parameter called `name`.
pub fn parameter(name: &str) -> Option<SearchParameter> {
    PARAMETERS.get(name).cloned()
}

/// Registry over the occurrence parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct OccurrenceParameters;

impl ParameterRegistry for OccurrenceParameters {
    fn lookup(&self, name: &str) -> Option<SearchParameter> {
        parameter(&name.to_uppercase())
    }

    /// Enum values are matched by constant name (`still image` and
    /// `StillImage` are not the same; `still_image` and `STILL_IMAGE` are).
    fn normalize_value(&self, key: &SearchParameter, value: &str) -> String {
        match key.value_type() {
            ValueType::Enum => value.trim().replace([' ', '-'], "_").to_uppercase(),
            ValueType::Boolean => value.trim().to_lowercase(),
            _ => value.to_string(),
        }
    }
}
