//! Relay CLI - Command line tool for the relay request cache.
//!
//! Commands:
//! - `relay demo` - Run a scripted session against the mock transport
//! - `relay config` - Manage configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{ConfigArgs, DemoArgs};

/// Relay CLI - Inspect and exercise the relay request cache
#[derive(Parser)]
#[command(name = "relay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted fetch and approval session
    Demo(DemoArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    let mut logging = ctx.config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if let Err(e) = relay_observability::init_logging(&logging) {
        ctx.output.warn(&format!("Logging disabled: {}", e));
    }

    let result = match cli.command {
        Commands::Demo(args) => commands::demo::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
