//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands that only touch local files run synchronously; commands that
//! talk to a server run on the async runtime.

use crate::cli::{Cli, Commands, ConfigCommands, OutputFormat, Shell, SortKey, SortOrder};
use crate::commands::display::DisplayOptions;
use crate::commands::notify::NotifyOptions;
use crate::commands::{self, CommandContext, CommandError, Result};

/// Trait for commands that run without network access.
pub trait LocalCommand {
    /// Execute the command.
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Trait for commands that talk to a remote server.
#[allow(async_fn_in_trait)]
pub trait NetworkCommand {
    /// Execute the command.
    async fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Commands that only read local files.
pub enum LocalDispatch<'a> {
    When(&'a [String]),
    Display {
        output_format: OutputFormat,
        sort_key: SortKey,
        order: SortOrder,
        expired: bool,
        hide_silenced: bool,
    },
    Recent {
        category: &'a str,
        count: usize,
    },
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> LocalDispatch<'a> {
    /// Try to create a local dispatch from the CLI command.
    /// Returns None if the command needs the network.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::When { queries }) => Some(Self::When(queries)),
            Some(Commands::Display {
                output_format,
                sort_key,
                order,
                expired,
                hide_silenced,
            }) => Some(Self::Display {
                output_format: *output_format,
                sort_key: *sort_key,
                order: *order,
                expired: *expired,
                hide_silenced: *hide_silenced,
            }),
            Some(Commands::Recent { category, count }) => Some(Self::Recent {
                category,
                count: *count,
            }),
            Some(Commands::Config { command }) => Some(Self::Config(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(shell)),
            None => Some(Self::Help),
            Some(Commands::Notify { .. }) => None,
        }
    }
}

impl LocalCommand for LocalDispatch<'_> {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::When(queries) => commands::when::execute(ctx, queries),
            Self::Display {
                output_format,
                sort_key,
                order,
                expired,
                hide_silenced,
            } => {
                let opts = DisplayOptions {
                    output_format: *output_format,
                    sort_key: *sort_key,
                    order: *order,
                    expired: *expired,
                    hide_silenced: *hide_silenced,
                };
                commands::display::execute(ctx, &opts)
            }
            Self::Recent { category, count } => commands::recent::execute(ctx, category, *count),
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("tt - when did I last do it?");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
    }
}

/// Commands that talk to a notification server.
pub enum NetworkDispatch<'a> {
    Notify {
        topic: &'a Option<String>,
        server: &'a Option<String>,
        dry_run: bool,
    },
}

impl<'a> NetworkDispatch<'a> {
    /// Create a network dispatch from the CLI command.
    pub fn from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Notify {
                topic,
                server,
                dry_run,
            }) => Some(Self::Notify {
                topic,
                server,
                dry_run: *dry_run,
            }),
            _ => None,
        }
    }
}

impl NetworkCommand for NetworkDispatch<'_> {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Notify {
                topic,
                server,
                dry_run,
            } => {
                let opts = NotifyOptions {
                    topic: (*topic).clone(),
                    server: (*server).clone(),
                    dry_run: *dry_run,
                };
                commands::notify::execute(ctx, &opts).await
            }
        }
    }
}
