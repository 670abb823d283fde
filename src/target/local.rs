//! Local-filesystem storage backend.
//!
//! The reference `Target`/`Directory` implementation over `std::fs`, used by
//! tests and by embedders whose artifacts live on a local disk.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Directory, StorageError, Target};

/// A single file on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTarget {
    path: PathBuf,
}

impl LocalTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalTarget { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Target for LocalTarget {
    type Directory = LocalDirectory;

    fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn remove(&self) -> Result<(), StorageError> {
        fs::remove_file(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn parent(&self) -> Option<LocalDirectory> {
        self.path.parent().map(LocalDirectory::new)
    }

    fn copy_from_local(&self, source: &Path) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::copy(source, &self.path)
            .map(|_| ())
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

/// A directory on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDirectory {
    path: PathBuf,
}

impl LocalDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalDirectory { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Directory for LocalDirectory {
    type Target = LocalTarget;

    fn child(&self, basename: &str) -> LocalTarget {
        LocalTarget::new(self.path.join(basename))
    }

    fn ensure_exists(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
