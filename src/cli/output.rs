//! Terminal output for sort results
//!
//! Status lines go to stdout with colors (NO_COLOR, CLICOLOR and
//! CLICOLOR_FORCE are honoured), errors go to stderr. Document and config
//! text is written uncolored so it can be redirected.

use std::io::{self, Write};
use std::path::Path;

use colored::Colorize;

use crate::infrastructure::{InfraError, InfraResult};

/// Red bold "error:" prefix on stderr.
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// A document was rewritten.
pub fn sorted(path: &Path, project: &str, items: usize) {
    println!(
        "{}: {} ({}, {} items)",
        "sorted".green(),
        path.display(),
        project,
        items
    );
}

pub fn unchanged(path: &Path) {
    println!("  unchanged: {}", path.display());
}

/// `--check` verdict for one document.
pub fn check(path: &Path, canonical: bool) {
    if canonical {
        println!("  {} sorted: {}", "✓".green(), path.display());
    } else {
        println!("  {} not sorted: {}", "✗".red(), path.display());
    }
}

/// Cyan header separating documents in a multi-document dry run.
pub fn document_header(path: &Path) {
    println!("{}", path.display().to_string().cyan().bold());
}

/// Raw text (rendered document, config) exactly as given.
pub fn text(what: &'static str, content: &str) -> InfraResult<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(content.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(|e| InfraError::stdout(what, e))
}

/// One line of plain text.
pub fn line(what: &'static str, content: &str) -> InfraResult<()> {
    text(what, &format!("{}\n", content))
}
