//! Command implementations for the tt CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod display;
pub mod notify;
pub mod recent;
pub mod when;

use std::env;

use tally_store::query::EvalError;
use tally_store::StoreError;

use crate::cli::Cli;
use self::config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Record store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Malformed input on stdin.
    #[error("invalid input: {0}")]
    Input(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<EvalError> for CommandError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::Store(e) => CommandError::Store(e),
            EvalError::Io(e) => CommandError::Io(e),
            EvalError::Json(e) => CommandError::Json(e),
        }
    }
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
    /// The loaded configuration file (defaults if absent).
    pub config: Config,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and the loaded config.
    ///
    /// Colors are disabled by `--no-color` or a non-empty `NO_COLOR` variable.
    pub fn from_cli(cli: &Cli, config: Config) -> Self {
        let no_color_env = env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && !no_color_env,
            quiet: cli.quiet,
            verbose: cli.verbose,
            config,
        }
    }
}
