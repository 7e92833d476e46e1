use thiserror::Error;

/// Errors raised while building a predicate. A predicate that fails any of
/// these checks is never constructed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("Value for parameter '{key}' may not be empty")]
    EmptyValue { key: String },

    #[error("Value list for parameter '{key}' may not be empty")]
    EmptyValues { key: String },

    #[error("Compound predicates need at least one child")]
    EmptyCompound,

    /// Only number and date parameters support ordering comparisons.
    #[error("Only equals comparisons are allowed for search parameter '{key}'")]
    NonEqualsComparison { key: String },

    #[error("Geometry parameter '{key}' must use a Within predicate")]
    GeometryKey { key: String },

    /// Wildcard matching is reserved for free-text keys.
    #[error("Like predicates are not supported for search parameter '{key}'")]
    LikeNotAllowed { key: String },

    #[error("Invalid value '{value}' for parameter '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid geo distance: {0}")]
    InvalidGeoDistance(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    #[error("Unknown search parameter: {0}")]
    UnknownParameter(String),
}

/// Errors raised while lowering a predicate into a backend query.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("Unsupported predicate: {0}")]
    UnsupportedPredicate(String),

    #[error("Search parameter '{0}' is not mapped")]
    UnmappedParameter(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Invalid value '{value}' for parameter '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Predicate nesting exceeds the limit of {limit}")]
    TooDeep { limit: usize },
}

impl CompileError {
    pub fn invalid_value(key: &str, value: &str, source: impl std::fmt::Display) -> Self {
        CompileError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: source.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Cannot parse WKT: {message}")]
    Parse { message: String },

    #[error("{0} shape is not supported")]
    UnsupportedShape(String),

    #[error("Empty geometry")]
    Empty,

    #[error("Polygon with zero area")]
    ZeroArea,

    #[error("Ring needs at least 3 distinct points")]
    TooFewPoints,

    #[error("Ring is not closed")]
    UnclosedRing,

    #[error("Coordinates must be finite numbers")]
    NonFinite,

    #[error("Coordinate ({x} {y}) is out of range")]
    OutOfRange { x: f64, y: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RangeError {
    #[error("Not a number: {0}")]
    InvalidNumber(String),

    #[error("Not a date: {0}")]
    InvalidDate(String),

    #[error("Lower bound {lower} is greater than upper bound {upper}")]
    Inverted { lower: String, upper: String },
}

/// Errors raised when loading compiler settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}
