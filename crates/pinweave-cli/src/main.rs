//! Pinweave CLI - Command-line interface for running pin graphs.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "pinweave")]
#[command(author, version, about = "Pinweave - Reactive pin-and-signal graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new pinweave project
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Build a circuit from a blueprint and drive it
    Run {
        /// Blueprint file (.toml or .json)
        blueprint: String,

        /// Deliver a value to an input, as `node.tag=value` (value is JSON,
        /// or a plain string)
        #[arg(short, long)]
        send: Vec<String>,

        /// Activate a node's control pin (after all sends)
        #[arg(short, long)]
        activate: Vec<String>,

        /// Print emissions as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show the nodes and relations a blueprint builds
    Inspect {
        /// Blueprint file (.toml or .json)
        blueprint: String,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool, config: &Config) {
    let filter = EnvFilter::try_from_env("PINWEAVE_LOG").unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { config.log.level.as_str() };
        EnvFilter::new(level)
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    init_tracing(cli.verbose, &config);

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Run {
            blueprint,
            send,
            activate,
            json,
        } => commands::run::run(&blueprint, &send, &activate, json, &config),
        Commands::Inspect { blueprint, json } => commands::inspect::run(&blueprint, json),
    }
}
