pub mod compiler;
pub mod geo;
pub mod query;
pub mod resolver;

pub use compiler::SearchCompiler;
pub use query::{BoolQuery, Query, RangeQuery};
pub use resolver::SearchFieldResolver;
