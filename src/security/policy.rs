//! Blocked system locations and sensitive file patterns.

use crate::error::GateError;
use std::path::{Component, Path, PathBuf};

/// System locations that are never accessible.
pub const BLOCKED_PREFIXES: &[&str] = &[
    "/etc/",
    "/proc/",
    "/sys/",
    "/dev/",
    "/boot/",
    "/root/",
    "/var/log/",
    "/private/etc/",
    "/private/var/",
    "/System/",
    "/Library/",
    "C:\\Windows\\",
    "C:\\System32\\",
];

/// Substrings of credential-bearing files.
pub const SENSITIVE_PATTERNS: &[&str] = &[
    ".env",
    ".ssh",
    "id_rsa",
    "id_dsa",
    "id_ecdsa",
    "id_ed25519",
    ".aws/credentials",
    ".netrc",
    ".npmrc",
    ".pypirc",
    "credentials.json",
    "token.json",
    ".git/config",
    ".git-credentials",
    ".bash_history",
    ".zsh_history",
    ".bashrc",
    ".zshrc",
    "shadow",
    "passwd",
    "sudoers",
];

/// Static lists the path validator checks candidates against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPolicy {
    blocked_prefixes: Vec<String>,
    sensitive_patterns: Vec<String>,
}

impl PathPolicy {
    /// Creates a policy with the built-in blocked prefixes and sensitive patterns.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            blocked_prefixes: BLOCKED_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
            sensitive_patterns: SENSITIVE_PATTERNS.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    /// Creates a policy that blocks nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            blocked_prefixes: Vec::new(),
            sensitive_patterns: Vec::new(),
        }
    }

    /// Adds a blocked prefix. Include the trailing separator (`/srv/secret/`).
    #[must_use]
    pub fn with_blocked_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.blocked_prefixes.push(prefix.into());
        self
    }

    /// Adds a sensitive pattern. Matched case-insensitively.
    #[must_use]
    pub fn with_sensitive_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.sensitive_patterns.push(pattern.into());
        self
    }

    /// Returns the blocked prefixes.
    #[must_use]
    pub fn blocked_prefixes(&self) -> &[String] {
        &self.blocked_prefixes
    }

    /// Returns the sensitive patterns.
    #[must_use]
    pub fn sensitive_patterns(&self) -> &[String] {
        &self.sensitive_patterns
    }

    /// Checks whether `path` lies under a blocked system location.
    ///
    /// Both the lexically normalized form and the absolute form are compared,
    /// so relative paths that climb into `/etc` are caught too. A prefix also
    /// blocks the directory itself (`/etc` as well as `/etc/...`).
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput` for an empty path, `PathResolutionFailed` if the
    /// absolute form cannot be computed, and `PathBlocked` naming the prefix.
    pub fn check_blocked(&self, path: &Path) -> Result<(), GateError> {
        if path.as_os_str().is_empty() {
            return Err(GateError::empty_input("path"));
        }

        let expanded = expand_home(path);
        let normalized = normalize_lexical(&expanded);
        let absolute = absolute_lexical(&expanded)?;
        let forms = [
            normalized.to_string_lossy().into_owned(),
            absolute.to_string_lossy().into_owned(),
        ];

        for prefix in &self.blocked_prefixes {
            if forms.iter().any(|form| matches_prefix(form, prefix)) {
                return Err(GateError::path_blocked(prefix.clone()));
            }
        }
        Ok(())
    }

    /// Checks whether `path` looks like a credential-bearing file.
    ///
    /// # Errors
    ///
    /// Returns `PathSensitive` naming the first matching pattern.
    pub fn check_sensitive(&self, path: &Path) -> Result<(), GateError> {
        if path.as_os_str().is_empty() {
            return Ok(());
        }

        let normalized = normalize_lexical(&expand_home(path))
            .to_string_lossy()
            .to_lowercase();
        let basename = normalized
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or_default();

        for pattern in &self.sensitive_patterns {
            let pattern_lower = pattern.to_lowercase();
            if normalized.contains(&pattern_lower) || basename == pattern_lower {
                return Err(GateError::path_sensitive(pattern.clone()));
            }
        }
        Ok(())
    }
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Checks a path against the built-in blocked prefixes.
///
/// # Errors
///
/// See [`PathPolicy::check_blocked`].
pub fn is_path_blocked(path: impl AsRef<Path>) -> Result<(), GateError> {
    PathPolicy::builtin().check_blocked(path.as_ref())
}

/// Checks a path against the built-in sensitive patterns.
///
/// # Errors
///
/// See [`PathPolicy::check_sensitive`].
pub fn is_path_sensitive(path: impl AsRef<Path>) -> Result<(), GateError> {
    PathPolicy::builtin().check_sensitive(path.as_ref())
}

fn matches_prefix(candidate: &str, prefix: &str) -> bool {
    let bare = prefix.trim_end_matches(|c: char| c == '/' || c == '\\');
    if bare.is_empty() {
        return false;
    }
    // Drive-letter prefixes compare the way Windows does: ignoring ASCII case.
    if prefix.contains('\\') {
        let candidate = candidate.to_ascii_lowercase();
        let prefix = prefix.to_ascii_lowercase();
        let bare = bare.to_ascii_lowercase();
        return candidate == bare || candidate.starts_with(&prefix);
    }
    candidate == bare || candidate.starts_with(prefix)
}

/// Expands a leading `~` to the home directory. Other paths pass through.
pub(crate) fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) if components.as_path().as_os_str().is_empty() => home,
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Normalizes `.` and `..` components and duplicate separators without
/// touching the filesystem. `..` at the root stays at the root; leading `..`
/// in a relative path is kept.
pub(crate) fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Joins a relative path onto the current directory, then normalizes.
pub(crate) fn absolute_lexical(path: &Path) -> Result<PathBuf, GateError> {
    if path.is_absolute() {
        return Ok(normalize_lexical(path));
    }
    let cwd = std::env::current_dir()
        .map_err(|e| GateError::resolution_failed(format!("current directory unavailable: {e}")))?;
    Ok(normalize_lexical(&cwd.join(path)))
}
