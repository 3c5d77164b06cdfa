//! Error taxonomy for the search engine.
//!
//! The core never panics on caller-supplied input. Every fallible boundary
//! returns [`EngineError`]; `panic!`/`unwrap` are reserved for internal
//! invariant violations that would indicate a bug in this crate itself.

use std::fmt;

/// The single error type returned by fallible operations in this crate.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A precondition was violated at an API boundary: a null/empty input,
    /// a zero bound, a ratio outside `[0, 1]`, an empty `initials` list, a
    /// zero timeout, a zero iteration cap, and so on.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A user-supplied extension point (`generate_children`, `commit_impl`,
    /// a rescore hook) returned something illegal: empty, over the
    /// requested bound, or with the wrong completion state.
    #[error("invalid result from extension point: {0}")]
    InvalidResult(String),

    /// A state machine was used incorrectly: `commit` on an already
    /// committed [`crate::index::Index`]/[`crate::score::Score`], `copy` on
    /// a pending one, or enumerating past the end of a sequence.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// User code inside `generate_children`, `commit_impl`, or a rescore
    /// hook returned an error. Localised to the task that raised it; the
    /// round continues with that task contributing an empty frontier.
    #[error("task error: {0}")]
    TaskError(String),

    /// `Configuration::is_deterministic() == false` was requested. The
    /// scheduler's task-assignment hook-point for non-deterministic
    /// execution is documented but not implemented.
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl EngineError {
    /// Builds an [`EngineError::InvalidArgument`] from any displayable reason.
    pub fn invalid_argument(reason: impl fmt::Display) -> Self {
        Self::InvalidArgument(reason.to_string())
    }

    /// Builds an [`EngineError::InvalidResult`] from any displayable reason.
    pub fn invalid_result(reason: impl fmt::Display) -> Self {
        Self::InvalidResult(reason.to_string())
    }

    /// Builds an [`EngineError::InvalidOperation`] from any displayable reason.
    pub fn invalid_operation(reason: impl fmt::Display) -> Self {
        Self::InvalidOperation(reason.to_string())
    }

    /// Builds an [`EngineError::TaskError`] from any displayable reason.
    pub fn task_error(reason: impl fmt::Display) -> Self {
        Self::TaskError(reason.to_string())
    }

    /// Builds an [`EngineError::NotImplemented`] from any displayable reason.
    pub fn not_implemented(reason: impl fmt::Display) -> Self {
        Self::NotImplemented(reason.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_reason() {
        let err = EngineError::invalid_argument("timeout must be non-zero");
        assert!(err.to_string().contains("timeout must be non-zero"));
    }

    #[test]
    fn constructors_select_the_right_variant() {
        assert!(matches!(
            EngineError::invalid_result("empty"),
            EngineError::InvalidResult(_)
        ));
        assert!(matches!(
            EngineError::invalid_operation("double commit"),
            EngineError::InvalidOperation(_)
        ));
        assert!(matches!(
            EngineError::task_error("boom"),
            EngineError::TaskError(_)
        ));
        assert!(matches!(
            EngineError::not_implemented("nondeterministic mode"),
            EngineError::NotImplemented(_)
        ));
    }
}
