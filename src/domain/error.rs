//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Errors raised while forcing values of a target tree.
///
/// Classification predicates (`is_attrs`, `is_artifact`, `is_annotated`)
/// never surface these; they only reach callers that explicitly force or
/// select a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value that fails on purpose when forced (e.g. the help attribute).
    #[error("{0}")]
    Thrown(String),

    #[error("attribute '{path}' missing")]
    MissingAttribute { path: String },

    #[error("value at '{path}' is not an attribute set")]
    NotAttrs { path: String },

    #[error("invalid attribute path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("self reference '{path}' read before the tree was finalized")]
    SelfNotReady { path: String },

    /// Forcing nested deeper than the recursion limit, usually a reference cycle.
    #[error("infinite recursion while forcing '{path}'")]
    InfiniteRecursion { path: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
