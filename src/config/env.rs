//! Environment variable overrides.
//!
//! Every override is read once, when configuration is loaded. Variables use
//! the `AGENT_GATE_` prefix.

use crate::config::types::GateConfig;
use crate::error::GateError;
use crate::logging::LogLevel;
use std::path::PathBuf;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "AGENT_GATE_";

/// Applies `AGENT_GATE_*` overrides to `config`.
///
/// `lookup` returns the value of a variable by its full name; [`super::load`]
/// passes `std::env::var`, tests pass a map.
///
/// # Errors
///
/// Returns a `Configuration` error naming the variable when a value does not
/// parse.
pub fn apply_env_overrides<F>(config: &mut GateConfig, lookup: F) -> Result<(), GateError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| {
        let key = format!("{ENV_PREFIX}{name}");
        lookup(&key).map(|value| (key, value))
    };

    if let Some((key, value)) = var("MAX_PROMPT_LENGTH") {
        config.security.max_prompt_length = value.trim().parse().map_err(|e| {
            GateError::configuration(key, format!("expected a positive integer: {e}"))
        })?;
    }
    if let Some((key, value)) = var("ENABLE_INJECTION_FILTER") {
        config.security.enable_injection_filter = parse_bool(&key, &value)?;
    }
    if let Some((key, value)) = var("ENABLE_PATH_VALIDATION") {
        config.security.enable_path_validation = parse_bool(&key, &value)?;
    }
    if let Some((key, value)) = var("ALLOW_SENSITIVE") {
        config.security.allow_sensitive = parse_bool(&key, &value)?;
    }
    if let Some((key, value)) = var("LOG_LEVEL") {
        config.logging.level = value
            .parse::<LogLevel>()
            .map_err(|reason| GateError::configuration(key, reason))?;
    }
    if let Some((_, value)) = var("LOG_DIR") {
        let value = value.trim();
        config.logging.log_dir = (!value.is_empty()).then(|| PathBuf::from(value));
    }

    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, GateError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(GateError::configuration(
            key,
            format!("expected true or false, got '{other}'"),
        )),
    }
}
