use crate::{error::CompileError, predicate::Predicate};

/// A backend that lowers predicates into its own query form.
pub trait PredicateCompiler {
    /// The compiled query.
    type Output;

    /// Compile a predicate. `None` compiles to a query matching every record.
    fn compile(&self, predicate: Option<&Predicate>) -> Result<Self::Output, CompileError>;
}

/// Fails when a predicate nests deeper than `limit`.
pub fn check_depth(predicate: &Predicate, limit: usize) -> Result<(), CompileError> {
    if predicate.depth() > limit {
        return Err(CompileError::TooDeep { limit });
    }
    Ok(())
}
