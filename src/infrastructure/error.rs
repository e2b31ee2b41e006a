//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// Failures outside any single document: process environment and terminal.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("cannot determine working directory")]
    WorkingDirectory(#[source] std::io::Error),

    #[error("cannot write {what} to stdout")]
    Stdout {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl InfraError {
    pub fn stdout(what: &'static str, source: std::io::Error) -> Self {
        Self::Stdout { what, source }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
