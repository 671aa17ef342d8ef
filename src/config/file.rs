//! Configuration file loading.
//!
//! This module handles loading agent-gate configuration from TOML files
//! at XDG-compliant locations.

use crate::config::env::apply_env_overrides;
use crate::config::types::GateConfig;
use crate::error::GateError;
use std::path::{Path, PathBuf};

/// Default configuration file name for project-local config.
const LOCAL_CONFIG_NAME: &str = "agent-gate.toml";

/// Default configuration file name within XDG config directory.
const XDG_CONFIG_NAME: &str = "config.toml";

/// Application name for XDG directory lookup.
const APP_NAME: &str = "agent-gate";

/// Loads configuration from the default search paths, then applies
/// `AGENT_GATE_*` environment overrides.
///
/// Search order:
/// 1. `./agent-gate.toml` (project-local)
/// 2. `~/.config/agent-gate/config.toml` (XDG config)
///
/// Returns the defaults (plus overrides) if no config file is found.
///
/// # Errors
///
/// Returns a `Configuration` error if a config file exists but cannot be
/// parsed, or an override or resulting value is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use agent_gate::config::load;
///
/// let config = load()?;
/// println!("max prompt length: {}", config.security.max_prompt_length);
/// ```
pub fn load() -> Result<GateConfig, GateError> {
    let config = match search_paths().into_iter().find(|p| p.exists()) {
        Some(path) => from_path(&path)?,
        None => GateConfig::default(),
    };
    with_env(config)
}

/// Loads configuration from `path` instead of the search paths, then applies
/// `AGENT_GATE_*` environment overrides.
///
/// # Errors
///
/// Same as [`load`], plus a missing file is an error.
pub fn load_from(path: &Path) -> Result<GateConfig, GateError> {
    with_env(from_path(path)?)
}

fn with_env(mut config: GateConfig) -> Result<GateConfig, GateError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a specific file path.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file contains invalid TOML
/// - The TOML doesn't match the expected schema
/// - A value is out of range
pub fn from_path(path: &Path) -> Result<GateConfig, GateError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        GateError::configuration(
            "config_file",
            format!("failed to read '{}': {}", path.display(), e),
        )
    })?;

    from_str(&contents).map_err(|e| {
        GateError::configuration(
            "config_file",
            format!("failed to parse '{}': {}", path.display(), e),
        )
    })
}

/// Parses configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid, doesn't match the schema, or
/// holds an out-of-range value.
///
/// # Example
///
/// ```rust
/// use agent_gate::config::from_str;
///
/// let config = from_str("[security]\nmax_prompt_length = 2048\n").unwrap();
/// assert_eq!(config.security.max_prompt_length, 2048);
/// ```
pub fn from_str(toml_str: &str) -> Result<GateConfig, GateError> {
    let config: GateConfig = toml::from_str(toml_str)
        .map_err(|e| GateError::configuration("config", format!("invalid TOML: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Returns the paths that would be searched for configuration files.
///
/// This is useful for diagnostics and user guidance.
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_NAME)];

    if let Some(dir) = xdg_config_dir() {
        paths.push(dir.join(XDG_CONFIG_NAME));
    }

    paths
}

/// Returns the path to the XDG config directory for agent-gate.
///
/// This is `~/.config/agent-gate` on most systems.
#[must_use]
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME))
}
