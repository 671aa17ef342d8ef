//! Error types for agent-gate.
//!
//! Every check in the crate reports failure as a [`GateError`]. Errors are
//! plain values: they implement Display, Debug, Clone, PartialEq, Eq and
//! std::error::Error, and none of them ever carries unmasked caller text.
//!
//! No external error crates (anyhow, thiserror, eyre) are used in the library.

use std::fmt;
use std::path::PathBuf;

/// An error produced by one of the gate's checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateError {
    /// The specific error that occurred
    pub kind: GateErrorKind,
}

/// Specific gate error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateErrorKind {
    /// Required input was empty
    EmptyInput {
        /// What was empty ("prompt", "path", ...)
        what: &'static str,
    },
    /// Text is longer than the configured maximum after whitespace collapsing
    LengthExceeded {
        /// Length in characters
        length: usize,
        /// Configured maximum in characters
        max: usize,
    },
    /// A prompt-injection signature matched
    InjectionDetected {
        /// Category label of the matching rule
        category: &'static str,
        /// The matched text, credential-masked
        matched: String,
    },
    /// Path lies under a blocked system location
    PathBlocked {
        /// The blocked prefix that matched
        prefix: String,
    },
    /// Path looks like a credential-bearing file
    PathSensitive {
        /// The sensitive pattern that matched
        pattern: String,
    },
    /// Path escapes the required base directory
    PathTraversal {
        /// The resolved base directory
        base: PathBuf,
        /// Whether the escape went through a `..` component
        escaped_via_parent: bool,
    },
    /// The OS could not resolve the path
    PathResolutionFailed {
        /// The underlying error reason
        reason: String,
    },
    /// Required file or directory is absent
    NotFound {
        /// The path that was looked up
        path: PathBuf,
    },
    /// The program of an invocation is a shell interpreter
    ShellProgram {
        /// The program as given by the caller
        program: String,
    },
    /// A catalog rule failed to compile
    Catalog {
        /// The rule source text
        rule: String,
        /// The compiler's reason
        reason: String,
    },
    /// Configuration error
    Configuration {
        /// Which setting was invalid
        field: String,
        /// Why it was invalid
        reason: String,
    },
}

impl GateError {
    /// Creates a new GateError with the given kind.
    #[must_use]
    pub fn new(kind: GateErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an empty input error.
    #[must_use]
    pub fn empty_input(what: &'static str) -> Self {
        Self::new(GateErrorKind::EmptyInput { what })
    }

    /// Creates a length exceeded error.
    #[must_use]
    pub fn length_exceeded(length: usize, max: usize) -> Self {
        Self::new(GateErrorKind::LengthExceeded { length, max })
    }

    /// Creates an injection detected error. The matched text is masked here.
    #[must_use]
    pub fn injection_detected(category: &'static str, matched: &str) -> Self {
        Self::new(GateErrorKind::InjectionDetected {
            category,
            matched: crate::security::mask_api_keys(matched),
        })
    }

    /// Creates a blocked path error.
    #[must_use]
    pub fn path_blocked(prefix: impl Into<String>) -> Self {
        Self::new(GateErrorKind::PathBlocked {
            prefix: prefix.into(),
        })
    }

    /// Creates a sensitive path error.
    #[must_use]
    pub fn path_sensitive(pattern: impl Into<String>) -> Self {
        Self::new(GateErrorKind::PathSensitive {
            pattern: pattern.into(),
        })
    }

    /// Creates a path traversal error.
    #[must_use]
    pub fn path_traversal(base: impl Into<PathBuf>, escaped_via_parent: bool) -> Self {
        Self::new(GateErrorKind::PathTraversal {
            base: base.into(),
            escaped_via_parent,
        })
    }

    /// Creates a path resolution failed error.
    #[must_use]
    pub fn resolution_failed(reason: impl Into<String>) -> Self {
        Self::new(GateErrorKind::PathResolutionFailed {
            reason: reason.into(),
        })
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(GateErrorKind::NotFound { path: path.into() })
    }

    /// Creates a shell program error.
    #[must_use]
    pub fn shell_program(program: impl Into<String>) -> Self {
        Self::new(GateErrorKind::ShellProgram {
            program: program.into(),
        })
    }

    /// Creates a catalog compilation error.
    #[must_use]
    pub fn catalog(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(GateErrorKind::Catalog {
            rule: rule.into(),
            reason: reason.into(),
        })
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(GateErrorKind::Configuration {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Returns true if this error rejects a path (blocked, sensitive or traversal).
    #[must_use]
    pub fn is_path_rejection(&self) -> bool {
        matches!(
            self.kind,
            GateErrorKind::PathBlocked { .. }
                | GateErrorKind::PathSensitive { .. }
                | GateErrorKind::PathTraversal { .. }
        )
    }

    /// Returns true if this error reports a detected injection attempt.
    #[must_use]
    pub fn is_injection(&self) -> bool {
        matches!(self.kind, GateErrorKind::InjectionDetected { .. })
    }

    /// Returns true if this error indicates a configuration problem.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, GateErrorKind::Configuration { .. })
    }
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            GateErrorKind::EmptyInput { what } => write!(f, "empty {}", what),
            GateErrorKind::LengthExceeded { length, max } => {
                write!(f, "input exceeds maximum length: {} > {} characters", length, max)
            }
            GateErrorKind::InjectionDetected { category, matched } => {
                write!(
                    f,
                    "potential injection pattern detected ({}): '{}'",
                    category, matched
                )
            }
            GateErrorKind::PathBlocked { prefix } => {
                write!(f, "access to system path blocked: {}", prefix)
            }
            GateErrorKind::PathSensitive { pattern } => {
                write!(
                    f,
                    "access to sensitive file denied: pattern '{}' matched",
                    pattern
                )
            }
            GateErrorKind::PathTraversal {
                base,
                escaped_via_parent: true,
            } => {
                write!(
                    f,
                    "path traversal detected: path escapes base directory '{}'",
                    base.display()
                )
            }
            GateErrorKind::PathTraversal {
                base,
                escaped_via_parent: false,
            } => {
                write!(
                    f,
                    "path is outside allowed base directory '{}'",
                    base.display()
                )
            }
            GateErrorKind::PathResolutionFailed { reason } => {
                write!(f, "path resolution failed: {}", reason)
            }
            GateErrorKind::NotFound { path } => {
                write!(f, "'{}' not found", path.display())
            }
            GateErrorKind::ShellProgram { program } => {
                write!(
                    f,
                    "refusing to run shell interpreter '{}'; pass the target program and its arguments directly",
                    program
                )
            }
            GateErrorKind::Catalog { rule, reason } => {
                write!(f, "pattern '{}' failed to compile: {}", rule, reason)
            }
            GateErrorKind::Configuration { field, reason } => {
                write!(f, "invalid configuration for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for GateError {}
