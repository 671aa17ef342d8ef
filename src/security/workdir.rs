//! Safe working directory selection for external processes.

use crate::error::GateError;
use crate::security::path::PathValidator;
use crate::types::{WorkingDir, WorkingDirSource};
use std::path::{Path, PathBuf};

impl PathValidator<'_> {
    /// Picks a working directory from the candidate chain.
    ///
    /// Tries, in order: `requested`, `fallback`, the current directory, each
    /// of which must validate and be an existing directory. If all of them
    /// fail, the home directory is returned unvalidated so that callers
    /// always get a usable directory.
    ///
    /// The validator's base directory, if any, applies to every candidate.
    #[must_use]
    pub fn working_dir(&self, requested: Option<&Path>, fallback: Option<&Path>) -> WorkingDir {
        let candidates = [
            (requested.map(Path::to_path_buf), WorkingDirSource::Requested),
            (fallback.map(Path::to_path_buf), WorkingDirSource::Fallback),
            (current_dir(), WorkingDirSource::Current),
        ];

        for (candidate, source) in candidates {
            let Some(candidate) = candidate.filter(|p| !p.as_os_str().is_empty()) else {
                continue;
            };
            match self.resolve_directory(&candidate) {
                Ok(resolved) => return WorkingDir::resolved(resolved, source),
                Err(e) => {
                    tracing::debug!(?source, reason = %e, "working directory candidate rejected");
                }
            }
        }

        let home = home_dir();
        tracing::debug!(path = %home.display(), "falling back to home directory");
        WorkingDir::home(home)
    }
}

fn current_dir() -> Option<PathBuf> {
    match std::env::current_dir() {
        Ok(dir) => Some(dir),
        Err(e) => {
            tracing::debug!(
                reason = %GateError::resolution_failed(e.to_string()),
                "current directory unavailable"
            );
            None
        }
    }
}

/// The last-resort directory. The temp dir stands in when no home is known.
fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(std::env::temp_dir)
}

/// Picks a working directory with the built-in policy and no base directory.
#[must_use]
pub fn get_safe_working_dir(requested: Option<&Path>, fallback: Option<&Path>) -> WorkingDir {
    PathValidator::new().working_dir(requested, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn requested_directory_wins() {
        let requested = TempDir::new().unwrap();
        let fallback = TempDir::new().unwrap();

        let dir = get_safe_working_dir(Some(requested.path()), Some(fallback.path()));
        assert_eq!(dir.source(), WorkingDirSource::Requested);
        assert_eq!(dir.path(), requested.path().canonicalize().unwrap());
    }

    #[test]
    fn missing_requested_falls_through_to_fallback() {
        let fallback = TempDir::new().unwrap();

        let dir = get_safe_working_dir(
            Some(Path::new("/nonexistent/agent-gate/dir")),
            Some(fallback.path()),
        );
        assert_eq!(dir.source(), WorkingDirSource::Fallback);
        assert_eq!(dir.path(), fallback.path().canonicalize().unwrap());
    }

    #[test]
    fn file_is_not_a_working_directory() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let dir = get_safe_working_dir(Some(file.as_path()), Some(tmp.path()));
        assert_eq!(dir.source(), WorkingDirSource::Fallback);
    }

    #[test]
    fn blocked_requested_directory_is_skipped() {
        let fallback = TempDir::new().unwrap();
        let dir = get_safe_working_dir(Some(Path::new("/etc")), Some(fallback.path()));
        assert_eq!(dir.source(), WorkingDirSource::Fallback);
    }

    #[test]
    fn never_fails_to_return_a_directory() {
        let dir = get_safe_working_dir(Some(Path::new("/nonexistent")), None);
        assert!(matches!(
            dir.source(),
            WorkingDirSource::Current | WorkingDirSource::Home
        ));
        assert!(!dir.path().as_os_str().is_empty());
        if dir.source() == WorkingDirSource::Current {
            assert!(dir.path().is_absolute());
        }
    }

    #[test]
    fn base_dir_constrains_candidates() {
        let base = TempDir::new().unwrap();
        let inside = base.path().join("inside");
        fs::create_dir(&inside).unwrap();
        let outside = TempDir::new().unwrap();

        let validator = PathValidator::new().with_base_dir(base.path());
        let dir = validator.working_dir(Some(outside.path()), Some(inside.as_path()));
        assert_eq!(dir.source(), WorkingDirSource::Fallback);
        assert_eq!(dir.path(), inside.canonicalize().unwrap());
    }

    #[test]
    fn empty_candidates_are_ignored() {
        let fallback = TempDir::new().unwrap();
        let dir = get_safe_working_dir(Some(Path::new("")), Some(fallback.path()));
        assert_eq!(dir.source(), WorkingDirSource::Fallback);
    }
}
