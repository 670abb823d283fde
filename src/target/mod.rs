//! Artifact storage abstraction.
//!
//! The cascade treats artifacts opaquely; all it needs from a storage
//! backend is a narrow contract: address a location, check/remove it,
//! resolve its parent directory, and derive sibling locations by basename.
//! The trait seam keeps the core testable against in-memory mocks the same
//! way the execution-side interpreters are mocked.

pub mod local;

pub use local::{LocalDirectory, LocalTarget};

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O operation on an addressed location failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A target has no parent directory to derive siblings from.
    #[error("target {target} has no parent directory")]
    NoParentDirectory { target: String },
}

/// An addressable single-artifact location.
pub trait Target: Clone + fmt::Debug {
    type Directory: Directory<Target = Self>;

    /// The last path component, including any extension.
    fn basename(&self) -> String;

    /// Returns true if an artifact exists at this location.
    fn exists(&self) -> bool;

    /// Removes the artifact at this location.
    fn remove(&self) -> Result<(), StorageError>;

    /// The containing directory, if the location has one.
    fn parent(&self) -> Option<Self::Directory>;

    /// Creates the artifact by copying a local source file here.
    fn copy_from_local(&self, source: &Path) -> Result<(), StorageError>;
}

/// An addressable keyed collection of artifact locations.
pub trait Directory: Clone + fmt::Debug {
    type Target: Target<Directory = Self>;

    /// The location of a named child artifact inside this directory.
    fn child(&self, basename: &str) -> Self::Target;

    /// Ensures the directory itself exists.
    fn ensure_exists(&self) -> Result<(), StorageError>;
}

/// Splits a basename into (stem, extension-with-dot).
///
/// Mirrors the naming convention for derived siblings: `"out.root"` splits
/// into `("out", ".root")`, a dotless name keeps an empty extension.
pub fn split_basename(basename: &str) -> (&str, &str) {
    match basename.rfind('.') {
        Some(i) if i > 0 => basename.split_at(i),
        _ => (basename, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_basename_separates_extension() {
        assert_eq!(split_basename("out.root"), ("out", ".root"));
        assert_eq!(split_basename("archive.tar.gz"), ("archive.tar", ".gz"));
    }

    #[test]
    fn split_basename_without_extension() {
        assert_eq!(split_basename("output"), ("output", ""));
    }

    #[test]
    fn split_basename_hidden_file_is_all_stem() {
        assert_eq!(split_basename(".hidden"), (".hidden", ""));
    }
}
