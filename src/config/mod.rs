//! Configuration management for agent-gate.
//!
//! # Configuration File Format
//!
//! Configuration is stored in TOML format. The search order is:
//! 1. `./agent-gate.toml` (project-local)
//! 2. `~/.config/agent-gate/config.toml` (XDG config)
//!
//! Environment variables prefixed with `AGENT_GATE_` override file values.
//!
//! # Example Configuration
//!
//! ```toml
//! [security]
//! max_prompt_length = 100000
//! enable_injection_filter = true
//! enable_path_validation = true
//! allow_sensitive = false
//!
//! [logging]
//! enabled = true
//! level = "info"
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use agent_gate::config;
//!
//! // Load from default search paths plus environment
//! let config = config::load()?;
//!
//! // Load from a specific path
//! let config = config::from_path(Path::new("/srv/agent-gate.toml"))?;
//! ```

mod env;
mod file;
mod types;

pub use env::{apply_env_overrides, ENV_PREFIX};
pub use file::{from_path, from_str, load, load_from, search_paths, xdg_config_dir};
pub use types::{GateConfig, SecuritySettings};
