//! The occurrence deployment: its search parameters and how both backends
//! store them.

pub mod parameters;
pub mod search;
pub mod sql;

pub use parameters::{OccurrenceParameters, ParameterSpec, Storage, parameter};
pub use search::OccurrenceSearchFields;
pub use sql::OccurrenceSqlFields;

/// Classification used when a taxonomic predicate names none.
pub const DEFAULT_CHECKLIST_KEY: &str = "d7dddbf4-2cf0-4f39-9b2a-bb099caae36c";
