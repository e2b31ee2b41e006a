//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),

    #[error("{0} document(s) not sorted")]
    Unsorted(usize),

    /// Some documents failed; the code is the first failure's.
    #[error("{failed} of {total} document(s) failed")]
    Failed {
        failed: usize,
        total: usize,
        exit_code: i32,
    },
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Exit code for an application-level failure.
pub fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(DomainError::MissingField { .. }) => crate::exitcode::DATAERR,
        ApplicationError::Domain(DomainError::NodeNotFound) => crate::exitcode::SOFTWARE,
        ApplicationError::Malformed { .. } => crate::exitcode::DATAERR,
        ApplicationError::Serialization { .. } => crate::exitcode::SOFTWARE,
        ApplicationError::Config { .. } => crate::exitcode::CONFIG,
        ApplicationError::OperationFailed { source, .. } => {
            match source.downcast_ref::<std::io::Error>() {
                Some(io) if io.kind() == std::io::ErrorKind::NotFound => crate::exitcode::NOINPUT,
                _ => crate::exitcode::IOERR,
            }
        }
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Unsorted(_) => crate::exitcode::UNSORTED,
            CliError::Failed { exit_code, .. } => *exit_code,
            CliError::Infra(e) => match e {
                InfraError::WorkingDirectory(_) | InfraError::Stdout { .. } => {
                    crate::exitcode::IOERR
                }
                InfraError::Application(e) => application_exit_code(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::xml::XmlError;

    #[test]
    fn given_malformed_document_when_mapping_then_data_error() {
        let err: CliError =
            ApplicationError::from_xml("pom.xml", XmlError::malformed(3, "x")).into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_missing_input_when_mapping_then_no_input() {
        let err: CliError = ApplicationError::OperationFailed {
            context: "locate document".into(),
            source: Box::new(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }

    #[test]
    fn given_closed_stdout_when_mapping_then_io_error() {
        let err: CliError = InfraError::stdout(
            "document",
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe"),
        )
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::IOERR);
    }

    #[test]
    fn given_unsorted_documents_when_mapping_then_one() {
        assert_eq!(CliError::Unsorted(2).exit_code(), 1);
    }
}
