//! Document sorting service
//!
//! Parses a POM, runs the requested passes over it in order and writes the
//! result back once. A failing pass leaves the file untouched.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt, XmlResultExt};
use crate::config::Settings;
use crate::domain::{rebuild_pass, Document, DomainResult, PassConfig, PassKind, SectionOutcome};
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::xml::{parse_bytes, render};

pub const POM_FILE_NAME: &str = "pom.xml";

/// What to do with the sorted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the file when its content changes
    Write,
    /// Keep the output in the report, write nothing
    DryRun,
    /// Only report whether the file is already canonical
    Check,
}

/// Outcome of one pass over one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub kind: PassKind,
    pub outcome: SectionOutcome,
}

/// Outcome of sorting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub project_id: String,
    pub passes: Vec<PassReport>,
    /// Output differs from the input
    pub changed: bool,
    pub written: bool,
    /// Rendered document, kept for dry runs
    pub output: Option<String>,
}

impl DocumentReport {
    /// Items reordered across all passes.
    pub fn sorted(&self) -> usize {
        self.passes.iter().map(|p| p.outcome.sorted()).sum()
    }
}

/// Run `passes` over `document` in order.
///
/// Stops at the first failing pass; passes already applied stay applied, so
/// callers must discard the document on error.
pub fn sort_document(
    document: &mut Document,
    passes: &[PassConfig],
    project_id: &str,
) -> DomainResult<Vec<PassReport>> {
    let mut reports = Vec::with_capacity(passes.len());
    for pass in passes {
        info!(
            project = project_id,
            pass = %pass.kind,
            "Sorting {} element for module {}",
            pass.parent,
            project_id
        );
        let outcome = rebuild_pass(document, pass)?;
        match outcome {
            SectionOutcome::Absent(reason) => {
                info!(
                    project = project_id,
                    pass = %pass.kind,
                    %reason,
                    "No {} element found for module {}, skipping",
                    pass.parent,
                    project_id
                );
            }
            SectionOutcome::Rebuilt { sorted, kept } => {
                info!(
                    project = project_id,
                    pass = %pass.kind,
                    kept,
                    "Sorted {} <{}> element for module {}",
                    sorted,
                    pass.item_label(),
                    project_id
                );
            }
        }
        reports.push(PassReport {
            kind: pass.kind,
            outcome,
        });
    }
    Ok(reports)
}

/// Diagnostic name of a document: its own `artifactId`, else the name of the
/// directory holding it.
pub fn project_id(document: &Document, path: &Path) -> String {
    let from_document = document
        .root_element()
        .and_then(|root| document.child_by_tag(root, "artifactId"))
        .map(|id| document.text_content(id).trim().to_string())
        .filter(|id| !id.is_empty());
    from_document
        .or_else(|| {
            path.parent()
                .and_then(|dir| dir.file_name())
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Sorting service.
pub struct SortService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl SortService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Resolve inputs to document paths.
    ///
    /// A file is taken as is. A directory stands for its `pom.xml`, or with
    /// `recursive` for every `pom.xml` below it. Duplicates are dropped.
    #[instrument(level = "debug", skip(self))]
    pub fn discover(&self, inputs: &[PathBuf], recursive: bool) -> ApplicationResult<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut documents = Vec::new();

        for input in inputs {
            let found = if self.fs.is_dir(input) {
                if recursive {
                    let found = self
                        .fs
                        .find_named(input, POM_FILE_NAME, &self.settings.skip_dirs)
                        .with_path_context("search for POM files", input)?;
                    if found.is_empty() {
                        return Err(not_found(input, "no pom.xml below directory"));
                    }
                    found
                } else {
                    let pom = input.join(POM_FILE_NAME);
                    if !self.fs.is_file(&pom) {
                        return Err(not_found(&pom, "no such file"));
                    }
                    vec![pom]
                }
            } else if self.fs.is_file(input) {
                vec![input.clone()]
            } else {
                return Err(not_found(input, "no such file or directory"));
            };

            for path in found {
                if seen.insert(path.clone()) {
                    documents.push(path);
                }
            }
        }
        debug!(count = documents.len(), "discovered documents");
        Ok(documents)
    }

    /// Rule tables for `kinds`, in order.
    pub fn pass_configs(&self, kinds: &[PassKind]) -> Vec<PassConfig> {
        kinds.iter().map(|&k| self.settings.pass_config(k)).collect()
    }

    /// Sort one document on disk.
    #[instrument(level = "debug", skip(self, kinds))]
    pub fn sort_path(
        &self,
        path: &Path,
        kinds: &[PassKind],
        project_override: Option<&str>,
        mode: WriteMode,
    ) -> ApplicationResult<DocumentReport> {
        let source = self.fs.read(path).with_path_context("read document", path)?;
        let mut document = parse_bytes(&source).for_document(path)?;

        let project_id = project_override
            .map(str::to_string)
            .unwrap_or_else(|| project_id(&document, path));
        let passes = sort_document(&mut document, &self.pass_configs(kinds), &project_id)?;

        let output = render(&document, &self.settings.writer_options()).for_document(path)?;
        let changed = output.as_bytes() != source.as_slice();

        let written = mode == WriteMode::Write && changed;
        if written {
            self.fs
                .write(path, &output)
                .with_path_context("write document", path)?;
            info!(project = %project_id, path = %path.display(), "wrote sorted document");
        } else {
            debug!(project = %project_id, changed, ?mode, "document not written");
        }

        Ok(DocumentReport {
            path: path.to_path_buf(),
            project_id,
            passes,
            changed,
            written,
            output: (mode == WriteMode::DryRun).then_some(output),
        })
    }
}

fn not_found(path: &Path, message: &str) -> ApplicationError {
    ApplicationError::OperationFailed {
        context: format!("locate document: {}", path.display()),
        source: Box::new(std::io::Error::new(std::io::ErrorKind::NotFound, message.to_string())),
    }
}
