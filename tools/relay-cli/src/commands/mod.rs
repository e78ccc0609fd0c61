//! CLI command implementations.

pub mod config;
pub mod demo;

use clap::{Args, Subcommand};

/// Arguments for the demo command.
#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Run with the cache disabled.
    #[arg(long)]
    pub no_cache: bool,

    /// Employee whose transactions are listed.
    #[arg(short, long, default_value = "E1")]
    pub employee: String,

    /// Transaction to toggle.
    #[arg(short, long, default_value = "T1")]
    pub approve: String,

    /// Set the transaction to unapproved instead.
    #[arg(long)]
    pub unapprove: bool,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            no_cache: false,
            employee: "E1".to_string(),
            approve: "T1".to_string(),
            unapprove: false,
        }
    }
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
    Validate,
}
