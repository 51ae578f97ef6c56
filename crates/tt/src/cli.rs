//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the tt CLI.

use clap::{Parser, Subcommand, ValueEnum};

/// tt - When did I last do it, and when is it due again?
#[derive(Parser, Debug)]
#[command(name = "tt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output for commands that print text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run queries and print their results as JSON lines
    #[command(alias = "w")]
    When {
        /// Query expressions (e.g., "food => food ~ 'vitamin' every 1d").
        /// Read from stdin, then the config file, when omitted.
        queries: Vec<String>,
    },

    /// Render a JSON-line result stream from stdin
    #[command(alias = "d")]
    Display {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
        output_format: OutputFormat,

        /// Sort results by this key
        #[arg(short, long, value_enum, default_value_t = SortKey::Epoch)]
        sort_key: SortKey,

        /// Sort order
        #[arg(long, value_enum, default_value_t = SortOrder::Asc)]
        order: SortOrder,

        /// Show only expired results that are not silenced
        #[arg(short, long)]
        expired: bool,

        /// Hide silenced results
        #[arg(long)]
        hide_silenced: bool,
    },

    /// Send a notification listing expired results read from stdin
    #[command(alias = "n")]
    Notify {
        /// Notification topic
        #[arg(long, env = "TALLY_NOTIFY_TOPIC")]
        topic: Option<String>,

        /// Notification server base URL (default: https://ntfy.sh)
        #[arg(long, env = "TALLY_NOTIFY_SERVER")]
        server: Option<String>,

        /// Print the message instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the most recent records of a category
    #[command(alias = "r")]
    Recent {
        /// Category name (e.g., "food")
        category: String,

        /// Number of records to show
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// How `display` renders results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned table with relative times
    Table,
    /// One name per line
    Name,
    /// JSON lines, unchanged
    Json,
}

/// Sort keys for `display`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Epoch,
    NextEpoch,
}

/// Sort direction
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration (default)
    Show,
    /// Show the config file path
    Path,
}
