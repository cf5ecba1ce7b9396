//! blockport command-line tool.
//!
//! Loads export definitions, resolves their drivers through the backend
//! registry and reports what a protocol server would serve.
//!
//! # Quick Start
//!
//! ```bash
//! # List the exports configured in ./blockport.toml
//! blockport exports
//!
//! # Open one export and print its geometry
//! blockport inspect disk0
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// blockport - file-backed block device exports for NBD servers.
#[derive(Parser)]
#[command(name = "blockport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory holding blockport.toml.
    #[arg(short, long, global = true)]
    project_dir: Option<PathBuf>,

    /// Load this TOML file instead of the layered project configuration.
    #[arg(short, long, global = true, conflicts_with = "project_dir")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// List registered backend drivers.
    Drivers,

    /// List configured exports.
    Exports,

    /// Open an export and print its geometry and capabilities.
    Inspect {
        /// Export name.
        name: String,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so command output stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let source = commands::ConfigSource::new(cli.project_dir, cli.config);

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Drivers => {
            commands::drivers::run();
            Ok(())
        }
        Commands::Exports => commands::exports::run(&source),
        Commands::Inspect { name } => commands::inspect::run(&source, &name),
    }
}
