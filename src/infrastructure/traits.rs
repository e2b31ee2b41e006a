//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::trace;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read raw file contents.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the file's content atomically.
    ///
    /// Readers see either the old or the new content, never a partial write.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Every file called `file_name` below `root`, sorted, skipping
    /// directories whose name is in `skip_dirs`.
    fn find_named(&self, root: &Path, file_name: &str, skip_dirs: &[String])
        -> io::Result<Vec<PathBuf>>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // same directory, so the final rename never crosses a device
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        if let Ok(metadata) = std::fs::metadata(path) {
            std::fs::set_permissions(temp.path(), metadata.permissions())?;
        }
        temp.persist(path).map_err(|e| e.error)?;
        trace!(path = %path.display(), bytes = content.len(), "replaced file");
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn find_named(
        &self,
        root: &Path,
        file_name: &str,
        skip_dirs: &[String],
    ) -> io::Result<Vec<PathBuf>> {
        use walkdir::WalkDir;

        let mut found = Vec::new();
        let walker = WalkDir::new(root).follow_links(false).into_iter();
        for entry in walker.filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !skip_dirs.iter().any(|s| e.file_name() == s.as_str())
        }) {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() && entry.file_name() == file_name {
                found.push(entry.into_path());
            }
        }
        found.sort();
        Ok(found)
    }
}
