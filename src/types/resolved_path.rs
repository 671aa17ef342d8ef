//! Path values that have already been through the validator.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// An absolute, symlink-resolved path that passed the path policy.
///
/// Only the path validator and the working directory resolver construct these,
/// so holding one means the checks ran.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(path)
    }

    /// Returns the resolved path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Consumes the value, returning the inner path.
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Which candidate the working directory resolver settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingDirSource {
    /// The directory the caller asked for.
    Requested,
    /// The caller's fallback directory.
    Fallback,
    /// The process's current directory.
    Current,
    /// The user's home directory, returned without validation.
    Home,
}

/// A working directory chosen by the resolver.
///
/// Every source except [`WorkingDirSource::Home`] yields a validated, resolved path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingDir {
    path: PathBuf,
    source: WorkingDirSource,
}

impl WorkingDir {
    pub(crate) fn resolved(path: ResolvedPath, source: WorkingDirSource) -> Self {
        Self {
            path: path.into_path_buf(),
            source,
        }
    }

    pub(crate) fn home(path: PathBuf) -> Self {
        Self {
            path,
            source: WorkingDirSource::Home,
        }
    }

    /// Returns the chosen directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns where the directory came from.
    #[must_use]
    pub fn source(&self) -> WorkingDirSource {
        self.source
    }

    /// Consumes the value, returning the directory.
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

impl AsRef<Path> for WorkingDir {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
