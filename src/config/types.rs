//! Configuration types.

use crate::error::GateError;
use crate::logging::LoggingConfig;
use crate::security::MAX_PROMPT_LENGTH;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
///
/// Represents the complete configuration loaded from a TOML file.
/// Missing tables and fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Prompt and path checking settings.
    pub security: SecuritySettings,
    /// File logging settings.
    pub logging: LoggingConfig,
}

impl GateConfig {
    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error naming the offending field.
    pub fn validate(&self) -> Result<(), GateError> {
        self.security.validate()?;
        if self.logging.app_name.trim().is_empty() {
            return Err(GateError::configuration(
                "logging.app_name",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

/// Settings that control how strictly the gate checks its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Maximum prompt length in characters, measured after whitespace collapse.
    pub max_prompt_length: usize,
    /// Whether prompts are scanned for injection patterns.
    pub enable_injection_filter: bool,
    /// Whether paths are checked against the policy and base directory.
    pub enable_path_validation: bool,
    /// Whether credential-bearing files are accepted by default.
    pub allow_sensitive: bool,
}

impl SecuritySettings {
    /// Creates settings with the default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum prompt length.
    #[must_use]
    pub fn with_max_prompt_length(mut self, max: usize) -> Self {
        self.max_prompt_length = max;
        self
    }

    /// Enables or disables injection filtering.
    #[must_use]
    pub fn with_injection_filter(mut self, enabled: bool) -> Self {
        self.enable_injection_filter = enabled;
        self
    }

    /// Enables or disables path validation.
    #[must_use]
    pub fn with_path_validation(mut self, enabled: bool) -> Self {
        self.enable_path_validation = enabled;
        self
    }

    /// Sets whether sensitive files are accepted by default.
    #[must_use]
    pub fn with_allow_sensitive(mut self, allow: bool) -> Self {
        self.allow_sensitive = allow;
        self
    }

    /// Checks that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if `max_prompt_length` is zero.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.max_prompt_length == 0 {
            return Err(GateError::configuration(
                "security.max_prompt_length",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            max_prompt_length: MAX_PROMPT_LENGTH,
            enable_injection_filter: true,
            enable_path_validation: true,
            allow_sensitive: false,
        }
    }
}
