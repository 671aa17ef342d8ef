//! # agent-gate: input and path security for agent wrappers
//!
//! Checks untrusted prompt text and filesystem paths before they reach a
//! process-spawning call into an external command-line agent.
//!
//! ## Architecture
//!
//! - **Security**: pattern catalog, injection detection, credential masking,
//!   prompt sanitization, path policy and validation, working directory
//!   selection, filename sanitization, shell escaping
//! - **Invocation**: argv-only preflight that never routes through a shell
//! - **Gate**: one shareable value holding the catalog, policy and settings
//! - **Config**: TOML file plus `AGENT_GATE_*` environment overrides
//! - **Logging**: daily rolling log files via `tracing-appender`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agent_gate::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), GateError> {
//! let config = agent_gate::config::load()?;
//! let gate = Gate::new(config.security)?;
//!
//! let request = InvocationRequest::new("codex")
//!     .arg("exec")
//!     .prompt_arg("explain the build failure")
//!     .working_dir("/home/dev/project")
//!     .base_dir("/home/dev/project");
//!
//! let prepared = gate.prepare(&request)?;
//! let _command = prepared.to_command();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod invocation;
pub mod logging;
pub mod security;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{GateConfig, SecuritySettings};
    pub use crate::error::{GateError, GateErrorKind};
    pub use crate::gate::Gate;
    pub use crate::invocation::{InvocationRequest, PreparedInvocation};
    pub use crate::security::{
        detect_injection, escape_for_shell, get_safe_working_dir, mask_api_keys,
        sanitize_filename, sanitize_for_prompt, validate_path_security, validate_prompt_safety,
        Masked, PathPolicy, PathValidator, PatternCatalog,
    };
    pub use crate::types::{ResolvedPath, ValidationOutcome, WorkingDir, WorkingDirSource};
}
