//! Path validation for filesystem security.
//!
//! Provides `PathValidator` for rejecting blocked system locations,
//! credential-bearing files and paths that escape a base directory.

use crate::error::GateError;
use crate::security::policy::{
    absolute_lexical, expand_home, normalize_lexical, PathPolicy,
};
use crate::types::{ResolvedPath, ValidationOutcome};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

static DEFAULT_POLICY: OnceLock<PathPolicy> = OnceLock::new();

/// Returns the process-wide built-in path policy.
pub fn default_policy() -> &'static PathPolicy {
    DEFAULT_POLICY.get_or_init(PathPolicy::builtin)
}

/// Validates candidate paths against a [`PathPolicy`].
///
/// `PathValidator` provides security controls for filesystem access by:
/// - Blocking system locations and (unless allowed) sensitive files
/// - Confining paths to an optional base directory
/// - Resolving symlinks before any containment comparison
///
/// Containment compares path components, so a base of `/work` does not
/// admit `/workbench`.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use agent_gate::security::PathValidator;
///
/// let validator = PathValidator::new().with_base_dir("/home/user/project");
///
/// // Inside the base directory
/// assert!(validator.check(Path::new("/home/user/project/src/main.rs")).is_ok());
///
/// // Escapes the base directory
/// assert!(validator.check(Path::new("/home/user/project/../secrets.txt")).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PathValidator<'p> {
    /// Blocked prefixes and sensitive patterns.
    policy: &'p PathPolicy,
    /// Directory every accepted path must resolve into.
    base_dir: Option<PathBuf>,
    /// Whether sensitive files are accepted.
    allow_sensitive: bool,
}

impl PathValidator<'static> {
    /// Creates a validator over the built-in policy, with no base directory,
    /// rejecting sensitive files.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(default_policy())
    }
}

impl<'p> PathValidator<'p> {
    /// Creates a validator over a specific policy.
    #[must_use]
    pub fn with_policy(policy: &'p PathPolicy) -> Self {
        Self {
            policy,
            base_dir: None,
            allow_sensitive: false,
        }
    }

    /// Requires accepted paths to resolve inside `base_dir`.
    ///
    /// An empty path means no base directory.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        self.base_dir = (!base_dir.as_os_str().is_empty()).then_some(base_dir);
        self
    }

    /// Sets whether files matching a sensitive pattern are accepted.
    #[must_use]
    pub fn allow_sensitive(mut self, allow: bool) -> Self {
        self.allow_sensitive = allow;
        self
    }

    /// Returns the base directory, if any.
    #[must_use]
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Returns whether sensitive files are accepted.
    #[must_use]
    pub fn allows_sensitive(&self) -> bool {
        self.allow_sensitive
    }

    /// Validates a path against the configured rules.
    ///
    /// Validation steps:
    /// 1. Reject an empty path
    /// 2. If the path has a `..` component, resolve it and make sure it stays
    ///    inside the base directory
    /// 3. Reject blocked system locations
    /// 4. Reject sensitive files unless allowed
    /// 5. With a base directory, resolve path and base and require containment
    ///
    /// The path does not have to exist.
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput`, `PathTraversal`, `PathBlocked`, `PathSensitive`
    /// or `PathResolutionFailed`.
    pub fn check(&self, path: &Path) -> Result<(), GateError> {
        if path.as_os_str().is_empty() {
            return Err(GateError::empty_input("path"));
        }

        if path.components().any(|c| c == Component::ParentDir) {
            let resolved = resolve_lenient(path)?;
            if let Some(ref base) = self.base_dir {
                let base_resolved = resolve_lenient(base)?;
                if !resolved.starts_with(&base_resolved) {
                    return Err(GateError::path_traversal(base_resolved, true));
                }
            }
        }

        self.policy.check_blocked(path)?;

        if !self.allow_sensitive {
            self.policy.check_sensitive(path)?;
        }

        // Applies with or without a `..` component: a symlink can escape too.
        if let Some(ref base) = self.base_dir {
            let resolved = resolve_lenient(path)?;
            let base_resolved = resolve_lenient(base)?;
            if !resolved.starts_with(&base_resolved) {
                return Err(GateError::path_traversal(base_resolved, false));
            }
        }

        Ok(())
    }

    /// Validates a path and resolves it to an existing, canonical location.
    ///
    /// The canonical path is checked against the blocked prefixes again, so a
    /// symlink pointing into a system location is refused.
    ///
    /// On macOS, temporary and project directories under `/var/folders`
    /// canonicalize to `/private/var/...` and are refused by the builtin
    /// policy, so [`get_safe_working_dir`](crate::security::get_safe_working_dir)
    /// falls through to home there. Use [`with_policy`](Self::with_policy)
    /// with a custom [`PathPolicy`] for such locations.
    ///
    /// # Errors
    ///
    /// Everything [`check`](Self::check) returns, plus `NotFound` when the
    /// path does not exist.
    pub fn resolve(&self, path: &Path) -> Result<ResolvedPath, GateError> {
        self.check(path)?;

        let canonical = expand_home(path).canonicalize().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                GateError::not_found(path)
            } else {
                GateError::resolution_failed(format!("cannot resolve '{}': {}", path.display(), e))
            }
        })?;

        self.policy.check_blocked(&canonical)?;

        Ok(ResolvedPath::new(canonical))
    }

    /// Validates a path for directory operations.
    ///
    /// Same as `resolve`, but the resolved path must be a directory.
    ///
    /// # Errors
    ///
    /// Returns error if validation fails or the path is not a directory.
    pub fn resolve_directory(&self, path: &Path) -> Result<ResolvedPath, GateError> {
        let resolved = self.resolve(path)?;
        if !resolved.as_path().is_dir() {
            return Err(GateError::not_found(path));
        }
        Ok(resolved)
    }
}

impl Default for PathValidator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a path the way `realpath` does in non-strict mode.
///
/// The longest existing ancestor is canonicalized (resolving symlinks), and
/// the components that do not exist yet are appended lexically.
fn resolve_lenient(path: &Path) -> Result<PathBuf, GateError> {
    let absolute = match expand_home(path) {
        p if p.is_absolute() => p,
        p => std::env::current_dir()
            .map_err(|e| GateError::resolution_failed(format!("current directory unavailable: {e}")))?
            .join(p),
    };

    for ancestor in absolute.ancestors() {
        match ancestor.canonicalize() {
            Ok(canonical) => {
                let rest = absolute.strip_prefix(ancestor).unwrap_or(Path::new(""));
                return Ok(normalize_lexical(&canonical.join(rest)));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(GateError::resolution_failed(format!(
                    "cannot resolve '{}': {}",
                    ancestor.display(),
                    e
                )))
            }
        }
    }

    // Nothing on the path exists, not even the root.
    absolute_lexical(&absolute)
}

/// Validates a path with the built-in policy.
///
/// `base_dir`, when given, confines the path to that directory's subtree.
#[must_use]
pub fn validate_path_security(
    path: impl AsRef<Path>,
    base_dir: Option<&Path>,
    allow_sensitive: bool,
) -> ValidationOutcome {
    let mut validator = PathValidator::new().allow_sensitive(allow_sensitive);
    if let Some(base) = base_dir {
        validator = validator.with_base_dir(base);
    }
    validator.check(path.as_ref()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GateErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn kind(result: Result<(), GateError>) -> GateErrorKind {
        result.unwrap_err().kind
    }

    #[test]
    fn new_uses_builtin_policy() {
        let validator = PathValidator::new();
        assert!(validator.base_dir().is_none());
        assert!(!validator.allows_sensitive());
        assert_eq!(validator.policy, &PathPolicy::builtin());
    }

    #[test]
    fn empty_base_dir_means_none() {
        let validator = PathValidator::new().with_base_dir("");
        assert!(validator.base_dir().is_none());
    }

    #[test]
    fn empty_path_fails() {
        assert_eq!(
            kind(PathValidator::new().check(Path::new(""))),
            GateErrorKind::EmptyInput { what: "path" }
        );
    }

    #[test]
    fn check_succeeds_within_base_dir() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("test.txt");
        fs::write(&file_path, "content").unwrap();

        let validator = PathValidator::new().with_base_dir(dir.path());
        assert!(validator.check(&file_path).is_ok());
    }

    #[test]
    fn check_accepts_missing_paths_within_base_dir() {
        let dir = TempDir::new().unwrap();
        let validator = PathValidator::new().with_base_dir(dir.path());
        assert!(validator
            .check(&dir.path().join("new_dir").join("nested").join("file.txt"))
            .is_ok());
    }

    #[test]
    fn check_fails_outside_base_dir() {
        let base = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let file_path = outside.path().join("test.txt");
        fs::write(&file_path, "content").unwrap();

        let validator = PathValidator::new().with_base_dir(base.path());
        assert!(matches!(
            kind(validator.check(&file_path)),
            GateErrorKind::PathTraversal {
                escaped_via_parent: false,
                ..
            }
        ));
    }

    #[test]
    fn sibling_with_shared_prefix_is_outside() {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join("work");
        let workbench = dir.path().join("workbench");
        fs::create_dir(&work).unwrap();
        fs::create_dir(&workbench).unwrap();
        fs::write(workbench.join("file"), "x").unwrap();

        let validator = PathValidator::new().with_base_dir(&work);
        assert!(matches!(
            kind(validator.check(&workbench.join("file"))),
            GateErrorKind::PathTraversal { .. }
        ));
        assert!(validator.check(&work.join("file")).is_ok());
    }

    #[test]
    fn parent_components_escaping_base_are_traversal() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("base");
        fs::create_dir(&base).unwrap();

        let validator = PathValidator::new().with_base_dir(&base);
        let candidate = base.join("..").join("..").join("etc").join("passwd");
        assert!(matches!(
            kind(validator.check(&candidate)),
            GateErrorKind::PathTraversal {
                escaped_via_parent: true,
                ..
            } | GateErrorKind::PathBlocked { .. }
        ));
    }

    #[test]
    fn parent_components_staying_inside_base_pass() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();

        let validator = PathValidator::new().with_base_dir(dir.path());
        assert!(validator.check(&sub.join("..").join("notes.txt")).is_ok());
    }

    #[test]
    fn blocked_system_paths_fail() {
        let validator = PathValidator::new();
        assert_eq!(
            kind(validator.check(Path::new("/etc/shadow"))),
            GateErrorKind::PathBlocked {
                prefix: "/etc/".to_string()
            }
        );
        assert!(matches!(
            kind(validator.check(Path::new("/tmp/../etc/gate-missing-file"))),
            GateErrorKind::PathBlocked { .. }
        ));
    }

    #[test]
    fn blocked_wins_even_when_sensitive_allowed() {
        let validator = PathValidator::new().allow_sensitive(true);
        assert!(matches!(
            kind(validator.check(Path::new("/etc/passwd"))),
            GateErrorKind::PathBlocked { .. }
        ));
    }

    #[test]
    fn sensitive_files_need_permission() {
        let dir = TempDir::new().unwrap();
        let ssh = dir.path().join(".ssh");
        fs::create_dir(&ssh).unwrap();
        let key = ssh.join("id_rsa");
        fs::write(&key, "-----BEGIN KEY-----").unwrap();

        assert!(matches!(
            kind(PathValidator::new().check(&key)),
            GateErrorKind::PathSensitive { .. }
        ));
        assert!(PathValidator::new().allow_sensitive(true).check(&key).is_ok());
    }

    #[test]
    fn home_ssh_key_is_rejected() {
        let err = PathValidator::new()
            .check(Path::new("~/.ssh/id_rsa"))
            .unwrap_err();
        assert!(err.is_path_rejection());
        // A home under a blocked prefix (e.g. /root) is reported as blocked first.
        if let Some(home) = dirs::home_dir() {
            if is_unblocked(&home) {
                assert!(matches!(err.kind, GateErrorKind::PathSensitive { .. }));
            }
        }
    }

    fn is_unblocked(path: &Path) -> bool {
        default_policy().check_blocked(path).is_ok()
    }

    #[test]
    fn resolve_returns_canonical_path() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("test.txt");
        fs::write(&file_path, "content").unwrap();

        let resolved = PathValidator::new().resolve(&file_path).unwrap();
        assert_eq!(resolved.as_path(), file_path.canonicalize().unwrap());
    }

    #[test]
    fn resolve_fails_for_nonexistent_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nonexistent.txt");
        let err = PathValidator::new().resolve(&missing).unwrap_err();
        assert_eq!(err.kind, GateErrorKind::NotFound { path: missing });
    }

    #[test]
    fn resolve_directory_fails_for_file() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("test.txt");
        fs::write(&file_path, "content").unwrap();

        let validator = PathValidator::new();
        assert!(validator.resolve_directory(dir.path()).is_ok());
        assert!(matches!(
            validator.resolve_directory(&file_path).unwrap_err().kind,
            GateErrorKind::NotFound { .. }
        ));
    }

    #[test]
    fn validate_path_security_outcomes() {
        let dir = TempDir::new().unwrap();
        let inside = dir.path().join("a.txt");

        let ok = validate_path_security(&inside, Some(dir.path()), false);
        assert!(ok.ok);
        assert!(ok.reason.is_none());

        let blocked = validate_path_security("/etc/shadow", None, false);
        assert!(!blocked.ok);
        assert!(blocked.reason.unwrap().contains("/etc/"));

        let empty = validate_path_security("", None, false);
        assert_eq!(empty.reason.as_deref(), Some("empty path"));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_follows_symlinks_within_base() {
        let dir = TempDir::new().unwrap();
        let real_file = dir.path().join("real.txt");
        let link = dir.path().join("link.txt");
        fs::write(&real_file, "content").unwrap();
        std::os::unix::fs::symlink(&real_file, &link).unwrap();

        let validator = PathValidator::new().with_base_dir(dir.path());
        let resolved = validator.resolve(&link).unwrap();
        assert_eq!(resolved.as_path(), real_file.canonicalize().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_base_without_parent_component_is_rejected() {
        let base = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let outside_file = outside.path().join("secret.txt");
        fs::write(&outside_file, "secret").unwrap();

        let escape_link = base.path().join("escape.txt");
        std::os::unix::fs::symlink(&outside_file, &escape_link).unwrap();

        let validator = PathValidator::new().with_base_dir(base.path());
        assert!(matches!(
            kind(validator.check(&escape_link)),
            GateErrorKind::PathTraversal {
                escaped_via_parent: false,
                ..
            }
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn resolve_rejects_symlink_into_system_location() {
        let dir = TempDir::new().unwrap();
        let link = dir.path().join("config_link");
        std::os::unix::fs::symlink("/etc", &link).unwrap();

        let validator = PathValidator::new();
        assert!(validator.check(&link).is_ok());
        assert!(matches!(
            validator.resolve(&link).unwrap_err().kind,
            GateErrorKind::PathBlocked { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loop_is_a_resolution_failure() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::os::unix::fs::symlink(&b, &a).unwrap();
        std::os::unix::fs::symlink(&a, &b).unwrap();

        let validator = PathValidator::new().with_base_dir(dir.path());
        assert!(matches!(
            kind(validator.check(&a.join("x"))),
            GateErrorKind::PathResolutionFailed { .. }
        ));

        let outcome = validate_path_security(a.join("x"), Some(dir.path()), false);
        assert!(!outcome.ok);
        assert!(outcome.reason.unwrap().starts_with("path resolution failed"));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_checks_the_canonical_form_against_the_policy() {
        let real = TempDir::new().unwrap();
        let links = TempDir::new().unwrap();
        let link = links.path().join("project");
        std::os::unix::fs::symlink(real.path(), &link).unwrap();

        let canonical = real.path().canonicalize().unwrap();
        let policy = PathPolicy::empty().with_blocked_prefix(format!("{}/", canonical.display()));

        let validator = PathValidator::with_policy(&policy);
        assert!(validator.check(&link).is_ok());
        assert!(matches!(
            validator.resolve(&link).unwrap_err().kind,
            GateErrorKind::PathBlocked { .. }
        ));

        let open = PathPolicy::empty();
        let resolved = PathValidator::with_policy(&open).resolve(&link).unwrap();
        assert_eq!(resolved.as_path(), canonical);
    }
}
