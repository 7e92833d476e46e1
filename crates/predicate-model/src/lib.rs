pub mod compiler;
pub mod error;
pub mod geometry;
pub mod parameter;
pub mod predicate;
pub mod range;
pub mod resolver;
pub mod settings;

pub use compiler::PredicateCompiler;
pub use error::{CompileError, ConstructionError, GeometryError, RangeError, SettingsError};
pub use parameter::{NumberKind, ParameterRegistry, SearchParameter, ValueType};
pub use predicate::{Predicate, RangeValue};
pub use resolver::FieldResolver;
pub use settings::{CompilerSettings, SqlDialectKind};
