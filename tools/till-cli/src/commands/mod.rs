//! CLI command implementations.

pub mod config;
pub mod demo;
pub mod repl;

use clap::{Args, Subcommand};

/// Arguments for the repl command.
#[derive(Args)]
pub struct ReplArgs {
    /// Identity to start the session as (defaults to the configured user).
    #[arg(short, long)]
    pub user: Option<String>,
}

/// Arguments for the demo command.
#[derive(Args)]
pub struct DemoArgs {
    /// Ticket grace period override in seconds.
    #[arg(long, default_value = "2")]
    pub grace: u64,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate {
        /// Config file to validate (default: till.toml).
        #[arg(default_value = "till.toml")]
        path: String,
    },
}
