use agent_gate::config::{self, GateConfig};
use agent_gate::error::GateError;
use agent_gate::gate::Gate;
use agent_gate::logging;
use agent_gate::security::{escape_for_shell, sanitize_filename};
use agent_gate::types::ValidationOutcome;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "agent-gate")]
#[command(version, about = "Check prompts and paths before they reach an external agent")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./agent-gate.toml, then the XDG config dir)
    #[arg(long, global = true, env = "AGENT_GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a prompt without rewriting it
    CheckPrompt {
        /// Prompt text; read from stdin when omitted
        text: Option<String>,
    },

    /// Print the sanitized form of a prompt
    Sanitize {
        /// Prompt text; read from stdin when omitted
        text: Option<String>,
    },

    /// Report the first injection signature in a text
    Detect {
        /// Text to scan; read from stdin when omitted
        text: Option<String>,
    },

    /// Mask API keys and tokens in a text
    Mask {
        /// Text to mask; read from stdin when omitted
        text: Option<String>,
    },

    /// Validate a path against the policy
    CheckPath {
        /// Candidate path
        path: PathBuf,

        /// Require the path to resolve inside this directory
        #[arg(long)]
        base: Option<PathBuf>,

        /// Accept credential-bearing files
        #[arg(long)]
        allow_sensitive: bool,
    },

    /// Pick a safe working directory
    Workdir {
        /// Preferred directory
        #[arg(long)]
        requested: Option<PathBuf>,

        /// Directory to use if the preferred one is rejected
        #[arg(long)]
        fallback: Option<PathBuf>,

        /// Require the directory to resolve inside this directory
        #[arg(long)]
        base: Option<PathBuf>,
    },

    /// Make a string safe to use as a filename
    Filename {
        /// Proposed name
        name: String,
    },

    /// Backslash-escape shell metacharacters
    Escape {
        /// Text to escape
        text: String,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => config::load_from(path),
        None => config::load(),
    }
    .context("failed to load configuration")?;

    init_logging(&config);

    let gate = Gate::new(config.security).context("failed to build gate")?;
    run(&gate, cli.command, cli.json)
}

fn init_logging(config: &GateConfig) {
    // The CLI still works without a log file.
    if let Err(e) = logging::init_and_store_logging(&config.logging) {
        eprintln!("warning: {e}");
    }
}

fn run(gate: &Gate, command: Commands, json: bool) -> Result<ExitCode> {
    match command {
        Commands::CheckPrompt { text } => {
            let text = text_or_stdin(text)?;
            report(gate.validate_prompt(&text), json)
        }
        Commands::Sanitize { text } => {
            let text = text_or_stdin(text)?;
            match gate.sanitize_prompt(&text) {
                Ok(sanitized) => {
                    if json {
                        println!("{}", serde_json::json!({ "ok": true, "text": sanitized }));
                    } else {
                        println!("{sanitized}");
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => report(ValidationOutcome::fail(&e), json),
            }
        }
        Commands::Detect { text } => {
            let text = text_or_stdin(text)?;
            let outcome = match gate.catalog().detect_injection(&text) {
                Some(hit) => {
                    ValidationOutcome::fail(&GateError::injection_detected(
                        hit.category.label(),
                        &hit.matched,
                    ))
                }
                None => ValidationOutcome::pass(),
            };
            report(outcome, json)
        }
        Commands::Mask { text } => {
            let text = text_or_stdin(text)?;
            print_value(&gate.mask(&text), json);
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckPath {
            path,
            base,
            allow_sensitive,
        } => {
            let mut validator = gate.path_validator(base.as_deref());
            if allow_sensitive {
                validator = validator.allow_sensitive(true);
            }
            report(validator.check(&path).into(), json)
        }
        Commands::Workdir {
            requested,
            fallback,
            base,
        } => {
            let dir = gate.working_dir(requested.as_deref(), fallback.as_deref(), base.as_deref());
            if json {
                println!("{}", serde_json::to_string(&dir)?);
            } else {
                println!("{}", dir.path().display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Filename { name } => {
            print_value(&sanitize_filename(&name), json);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Escape { text } => {
            print_value(&escape_for_shell(&text), json);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn text_or_stdin(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn report(outcome: ValidationOutcome, json: bool) -> Result<ExitCode> {
    if json {
        println!("{}", serde_json::to_string(&outcome)?);
    } else {
        println!("{outcome}");
    }
    Ok(if outcome.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_value(value: &str, json: bool) {
    if json {
        println!("{}", serde_json::json!({ "text": value }));
    } else {
        println!("{value}");
    }
}
