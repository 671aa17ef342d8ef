//! Input and path security checks.
//!
//! This module provides the checks every external-process invocation passes
//! through before it is spawned:
//!
//! - **Pattern catalog**: injection and credential signatures, compiled once
//! - **Injection detection / credential masking**: [`detect_injection`], [`mask_api_keys`]
//! - **Prompt sanitization**: [`sanitize_for_prompt`], [`validate_prompt_safety`]
//! - **Path policy / validation**: [`PathPolicy`], [`PathValidator`], [`validate_path_security`]
//! - **Working directory resolution**: [`get_safe_working_dir`]
//! - **Filename sanitization**: [`sanitize_filename`]
//! - **Shell escaping**: [`escape_for_shell`] (defense in depth only)
//!
//! ## Path Validation
//!
//! ```rust,ignore
//! use std::path::Path;
//! use agent_gate::security::PathValidator;
//!
//! let validator = PathValidator::new().with_base_dir("/home/user/project");
//!
//! match validator.resolve(Path::new("/home/user/project/src/main.rs")) {
//!     Ok(resolved) => println!("Validated: {resolved}"),
//!     Err(e) => eprintln!("Rejected: {e}"),
//! }
//! ```
//!
//! ## Default Security Settings
//!
//! The built-in policy blocks system locations such as `/etc/`, `/proc/` and
//! `/root/`, and rejects credential-bearing files such as `.env`, `.ssh` and
//! `id_rsa` unless sensitive access is allowed.

mod catalog;
mod detect;
mod filename;
mod path;
mod policy;
mod prompt;
mod shell;
mod workdir;

pub use catalog::{
    default_catalog, Category, PatternCatalog, PatternRule, CREDENTIAL_SOURCES, FILTERED_TOKEN,
    INJECTION_SOURCES, MASKED_KEY_TOKEN,
};
pub use detect::{detect_injection, mask_api_keys, InjectionMatch, Masked};
pub use filename::{sanitize_filename, MAX_FILENAME_LENGTH, UNNAMED};
pub use path::{default_policy, validate_path_security, PathValidator};
pub use policy::{
    is_path_blocked, is_path_sensitive, PathPolicy, BLOCKED_PREFIXES, SENSITIVE_PATTERNS,
};
pub use prompt::{collapse_whitespace, sanitize_for_prompt, validate_prompt_safety, MAX_PROMPT_LENGTH};
pub(crate) use prompt::bounded_prompt;
pub use shell::escape_for_shell;
pub use workdir::get_safe_working_dir;
