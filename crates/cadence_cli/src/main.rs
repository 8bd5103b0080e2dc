//! Cadence CLI
//!
//! Command-line tools for inspecting and syncing a Cadence data
//! directory.
//!
//! # Commands
//!
//! - `inspect` - Display snapshot and sync-cursor summary
//! - `sync` - Push local changes, then pull and merge remote state
//! - `push` - Push the local snapshot only
//! - `pull` - Pull and merge the remote snapshot only
//! - `reset` - Wipe local snapshot and sync cursor

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Cadence command-line sync tools.
#[derive(Parser)]
#[command(name = "cadence")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display snapshot and sync-cursor summary
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Push local changes, then pull and merge remote state
    Sync {
        /// Sync server base URL
        #[arg(short, long)]
        server: String,
    },

    /// Push the local snapshot to the server
    Push {
        /// Sync server base URL
        #[arg(short, long)]
        server: String,
    },

    /// Pull the remote snapshot and merge it into local state
    Pull {
        /// Sync server base URL
        #[arg(short, long)]
        server: String,
    },

    /// Wipe local snapshot and sync cursor
    Reset {
        /// Confirm the wipe; without this flag nothing is touched
        #[arg(long)]
        yes: bool,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("data directory path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Sync { server } => {
            let path = cli.path.ok_or("data directory path required for sync")?;
            commands::sync::run(&path, &server, commands::sync::Direction::Both).await?;
        }
        Commands::Push { server } => {
            let path = cli.path.ok_or("data directory path required for push")?;
            commands::sync::run(&path, &server, commands::sync::Direction::Push).await?;
        }
        Commands::Pull { server } => {
            let path = cli.path.ok_or("data directory path required for pull")?;
            commands::sync::run(&path, &server, commands::sync::Direction::Pull).await?;
        }
        Commands::Reset { yes } => {
            let path = cli.path.ok_or("data directory path required for reset")?;
            commands::reset::run(&path, yes)?;
        }
        Commands::Version => {
            println!("cadence {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
