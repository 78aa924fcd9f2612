//! Writing generated files to disk.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use miette::Diagnostic;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::generator::GeneratedFile;

/// Errors raised while writing generated files.
#[derive(Error, Debug, Diagnostic)]
pub enum WriteError {
    /// The output directory is empty.
    #[error("output directory cannot be empty")]
    #[diagnostic(code(typer::codegen::empty_base_dir))]
    EmptyBaseDir,

    /// A generated file has an empty path.
    #[error("generated file path cannot be empty")]
    #[diagnostic(code(typer::codegen::empty_path))]
    EmptyPath,

    /// A generated file path is absolute.
    #[error("generated file path `{path}` must be relative")]
    #[diagnostic(code(typer::codegen::absolute_path))]
    AbsolutePath {
        /// Offending path.
        path: String,
    },

    /// A generated file path escapes the output directory.
    #[error("generated file path `{path}` leaves the output directory")]
    #[diagnostic(
        code(typer::codegen::parent_traversal),
        help("remove `..` segments from the file name")
    )]
    ParentTraversal {
        /// Offending path.
        path: String,
    },

    /// Filesystem error.
    #[error("failed to write `{path}`")]
    #[diagnostic(code(typer::codegen::io_error))]
    Io {
        /// Path being written.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl WriteError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Writes generated files under a base directory.
///
/// Every file is checked before anything touches the disk. Each file is
/// then written to a temp file next to its destination and renamed over it,
/// so readers never observe a partial file.
#[derive(Debug, Clone)]
pub struct FileManager {
    base_dir: PathBuf,
}

impl FileManager {
    /// Create a manager writing under `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, WriteError> {
        let base_dir = base_dir.into();
        if base_dir.as_os_str().is_empty() {
            return Err(WriteError::EmptyBaseDir);
        }
        Ok(Self { base_dir })
    }

    /// The output directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write all files, returning their destinations.
    pub fn write_files(&self, files: &[GeneratedFile]) -> Result<Vec<PathBuf>, WriteError> {
        for file in files {
            check_path(&file.path)?;
        }

        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let dest = self.base_dir.join(&file.path);
            self.write_one(&dest, &file.content)?;
            debug!(path = %dest.display(), bytes = file.content.len(), "Wrote file");
            written.push(dest);
        }

        info!(count = written.len(), dir = %self.base_dir.display(), "Wrote generated files");
        Ok(written)
    }

    fn write_one(&self, dest: &Path, content: &str) -> Result<(), WriteError> {
        let parent = dest.parent().unwrap_or(self.base_dir.as_path());
        std::fs::create_dir_all(parent).map_err(|e| WriteError::io(parent, e))?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| WriteError::io(parent, e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| WriteError::io(dest, e))?;
        tmp.persist(dest).map_err(|e| WriteError::io(dest, e.error))?;
        Ok(())
    }
}

fn check_path(path: &Path) -> Result<(), WriteError> {
    if path.as_os_str().is_empty() {
        return Err(WriteError::EmptyPath);
    }
    if path.is_absolute() || path.has_root() {
        return Err(WriteError::AbsolutePath {
            path: path.display().to_string(),
        });
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(WriteError::ParentTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn file(path: &str, content: &str) -> GeneratedFile {
        GeneratedFile {
            path: PathBuf::from(path),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = FileManager::new(dir.path().join("out")).unwrap();

        let written = manager
            .write_files(&[file("typed_analytics.rs", "// one"), file("nested/two.rs", "// two")])
            .unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "// one");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("out/nested/two.rs")).unwrap(),
            "// two"
        );
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = FileManager::new(dir.path()).unwrap();

        manager.write_files(&[file("a.rs", "old")]).unwrap();
        manager.write_files(&[file("a.rs", "new")]).unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("a.rs")).unwrap(), "new");
    }

    #[test]
    fn test_rejects_bad_paths_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let manager = FileManager::new(dir.path()).unwrap();

        let err = manager
            .write_files(&[file("ok.rs", "x"), file("../escape.rs", "x")])
            .unwrap_err();
        assert!(matches!(err, WriteError::ParentTraversal { .. }));
        assert!(!dir.path().join("ok.rs").exists());

        let err = manager.write_files(&[file("", "x")]).unwrap_err();
        assert!(matches!(err, WriteError::EmptyPath));

        let absolute = dir.path().join("abs.rs");
        let err = manager
            .write_files(&[GeneratedFile {
                path: absolute,
                content: String::new(),
            }])
            .unwrap_err();
        assert!(matches!(err, WriteError::AbsolutePath { .. }));
    }

    #[test]
    fn test_empty_base_dir() {
        assert!(matches!(FileManager::new(""), Err(WriteError::EmptyBaseDir)));
    }
}
