//! Argv-only invocation preflight.
//!
//! An [`InvocationRequest`] describes the external agent to run: the program,
//! its arguments tagged by kind, and the directories to run it in. The
//! [`Gate`](crate::gate::Gate) turns it into a [`PreparedInvocation`] only
//! after every prompt argument is sanitized, every path argument is resolved
//! and a working directory is chosen.
//!
//! A prepared invocation builds an argv-style [`std::process::Command`]. No
//! argument is ever interpreted by a shell, which is why shell interpreters
//! are refused as the program.

use crate::error::GateError;
use crate::security::Masked;
use crate::types::WorkingDir;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Programs that would interpret their arguments as shell code.
pub const SHELL_PROGRAMS: &[&str] = &[
    "sh",
    "bash",
    "zsh",
    "dash",
    "fish",
    "ksh",
    "csh",
    "tcsh",
    "cmd",
    "cmd.exe",
    "powershell",
    "powershell.exe",
    "pwsh",
    "pwsh.exe",
];

/// A single argument, tagged with how it must be checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// Free text handed to the agent as a prompt; sanitized.
    Prompt(String),
    /// A filesystem path; validated and resolved.
    Path(PathBuf),
    /// A flag or value passed through unchanged.
    Plain(String),
}

/// What the caller wants to run.
///
/// # Example
///
/// ```rust
/// use agent_gate::invocation::InvocationRequest;
///
/// let request = InvocationRequest::new("codex")
///     .arg("exec")
///     .prompt_arg("summarize the failing tests")
///     .path_arg("/tmp")
///     .working_dir("/tmp");
/// assert_eq!(request.args().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    program: String,
    args: Vec<Argument>,
    working_dir: Option<PathBuf>,
    fallback_dir: Option<PathBuf>,
    base_dir: Option<PathBuf>,
}

impl InvocationRequest {
    /// Creates a request for `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            fallback_dir: None,
            base_dir: None,
        }
    }

    /// Appends a prompt argument.
    #[must_use]
    pub fn prompt_arg(mut self, text: impl Into<String>) -> Self {
        self.args.push(Argument::Prompt(text.into()));
        self
    }

    /// Appends a path argument.
    #[must_use]
    pub fn path_arg(mut self, path: impl Into<PathBuf>) -> Self {
        self.args.push(Argument::Path(path.into()));
        self
    }

    /// Appends a plain argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(Argument::Plain(value.into()));
        self
    }

    /// Sets the directory the agent should run in.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets the directory to use if the working directory is rejected.
    #[must_use]
    pub fn fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_dir = Some(dir.into());
        self
    }

    /// Confines path arguments and the working directory to `dir`.
    #[must_use]
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments in caller order.
    #[must_use]
    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Returns the requested working directory.
    #[must_use]
    pub fn requested_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Returns the fallback directory.
    #[must_use]
    pub fn fallback(&self) -> Option<&Path> {
        self.fallback_dir.as_deref()
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }
}

/// An invocation whose every input passed the gate.
#[derive(Debug, Clone)]
pub struct PreparedInvocation {
    program: String,
    argv: Vec<OsString>,
    working_dir: WorkingDir,
}

impl PreparedInvocation {
    pub(crate) fn new(program: String, argv: Vec<OsString>, working_dir: WorkingDir) -> Self {
        Self {
            program,
            argv,
            working_dir,
        }
    }

    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the checked arguments, excluding the program.
    #[must_use]
    pub fn argv(&self) -> &[OsString] {
        &self.argv
    }

    /// Returns the chosen working directory.
    #[must_use]
    pub fn working_dir(&self) -> &WorkingDir {
        &self.working_dir
    }

    /// Builds an argv-style command. Nothing is spawned.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.argv).current_dir(self.working_dir.path());
        command
    }

    /// Renders the invocation for a log line, with credentials masked.
    #[must_use]
    pub fn log_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.argv {
            line.push(' ');
            line.push_str(&format!("{:?}", arg.to_string_lossy()));
        }
        format!(
            "{} (cwd: {})",
            Masked(line),
            self.working_dir.path().display()
        )
    }
}

/// Rejects an empty program or a shell interpreter.
///
/// The comparison uses the file name, so `/bin/bash` and `BASH` are refused
/// as well.
///
/// # Errors
///
/// Returns `EmptyInput` or `ShellProgram`.
pub fn check_program(program: &str) -> Result<(), GateError> {
    let trimmed = program.trim();
    if trimmed.is_empty() {
        return Err(GateError::empty_input("program"));
    }

    let name = trimmed
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(trimmed)
        .to_ascii_lowercase();

    if SHELL_PROGRAMS.contains(&name.as_str()) {
        return Err(GateError::shell_program(trimmed));
    }
    Ok(())
}
