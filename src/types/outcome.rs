//! The `{ ok, reason }` result shape handed to calling agents.

use crate::error::GateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a single validation, in a form a calling agent can show a user.
///
/// `reason` is set only when `ok` is false. It is always derived from a
/// [`GateError`] display string, which never carries unmasked credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the check passed.
    pub ok: bool,
    /// Human-readable refusal reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationOutcome {
    /// A passing outcome.
    #[must_use]
    pub fn pass() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    /// A failing outcome carrying the error's reason.
    #[must_use]
    pub fn fail(error: &GateError) -> Self {
        Self {
            ok: false,
            reason: Some(error.to_string()),
        }
    }
}

impl<T> From<Result<T, GateError>> for ValidationOutcome {
    fn from(result: Result<T, GateError>) -> Self {
        match result {
            Ok(_) => Self::pass(),
            Err(e) => Self::fail(&e),
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.ok, &self.reason) {
            (true, _) => write!(f, "ok"),
            (false, Some(reason)) => write!(f, "rejected: {}", reason),
            (false, None) => write!(f, "rejected"),
        }
    }
}
