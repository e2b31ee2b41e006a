//! Attach the document path to lower-level failures.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::xml::XmlResult;

/// Filesystem failures while handling one document.
pub trait IoResultExt<T> {
    /// `action` names the step, e.g. "read document".
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Parse or render failures of one document.
pub trait XmlResultExt<T> {
    fn for_document(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> XmlResultExt<T> for XmlResult<T> {
    fn for_document(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::from_xml(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::xml::{parse_str, XmlError};

    #[test]
    fn given_missing_file_when_adding_context_then_keeps_kind_and_path() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));

        let err = result
            .with_path_context("read document", Path::new("core/pom.xml"))
            .unwrap_err();

        assert_eq!(err.to_string(), "operation failed: read document: core/pom.xml");
        let ApplicationError::OperationFailed { source, .. } = err else {
            panic!("expected OperationFailed");
        };
        let io = source.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn given_parse_failure_when_adding_context_then_malformed_names_document() {
        let err = parse_str("<project>").for_document(Path::new("web/pom.xml")).unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Malformed {
                source: XmlError::Malformed { .. },
                ..
            }
        ));
        assert!(err.to_string().starts_with("malformed document web/pom.xml"), "{}", err);
    }

    #[test]
    fn given_render_failure_when_adding_context_then_serialization() {
        let result: XmlResult<String> = Err(XmlError::Serialization("boom".into()));

        let err = result.for_document(Path::new("pom.xml")).unwrap_err();

        assert!(matches!(err, ApplicationError::Serialization { .. }));
    }
}
