pub mod compiler;
pub mod dialect;
pub mod geo;
pub mod renderer;
pub mod resolver;

pub use compiler::{MATCH_ALL, SqlCompiler};
pub use dialect::{Dialect, Hive, Spark, dialect_for};
pub use resolver::{DateUnit, SqlFieldResolver};
