//! Domain-level errors (no I/O concerns)

use thiserror::Error;

/// Errors raised while reordering a section of a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("<{item}> element has no <{field}> field")]
    MissingField { item: String, field: String },

    #[error("node no longer exists in the document")]
    NodeNotFound,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
