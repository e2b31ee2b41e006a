//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::xml::XmlError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("malformed document {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: XmlError,
    },

    #[error("cannot serialize {}: {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: XmlError,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// Attach the document path to a codec error.
    pub fn from_xml(path: impl Into<PathBuf>, source: XmlError) -> Self {
        let path = path.into();
        match source {
            XmlError::Malformed { .. } => Self::Malformed { path, source },
            XmlError::Serialization(_) => Self::Serialization { path, source },
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
