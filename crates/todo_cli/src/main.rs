//! Todo CLI
//!
//! Runs and maintains the to-do pages service.
//!
//! # Commands
//!
//! - `serve` - Serve the HTTP API
//! - `inspect` - Display store statistics
//! - `verify` - Check referential integrity between pages and items
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// To-do pages service.
#[derive(Parser)]
#[command(name = "todo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data directory
    #[arg(global = true, short, long)]
    data_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API (in memory unless a data directory is given)
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Prefix for every route, e.g. /to-do
        #[arg(long, default_value = "")]
        base_path: String,

        /// Maximum request body size in bytes
        #[arg(long, default_value_t = todo_server::DEFAULT_BODY_LIMIT)]
        body_limit: usize,

        /// Skip fsync on every commit
        #[arg(long)]
        no_sync: bool,
    },

    /// Display store statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check referential integrity between pages and items
    Verify,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides the default level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve {
            bind,
            base_path,
            body_limit,
            no_sync,
        } => {
            let options = commands::serve::ServeOptions {
                data_dir: cli.data_dir,
                bind,
                base_path,
                body_limit,
                sync_on_commit: !no_sync,
            };
            commands::serve::run(options)?;
        }
        Commands::Inspect { format } => {
            let path = cli
                .data_dir
                .ok_or(commands::CliError::MissingDataDir("inspect"))?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Verify => {
            let path = cli
                .data_dir
                .ok_or(commands::CliError::MissingDataDir("verify"))?;
            commands::verify::run(&path)?;
        }
        Commands::Version => {
            println!("todo v{}", env!("CARGO_PKG_VERSION"));
            println!("snapshot format v{}", todo_store::SNAPSHOT_VERSION);
        }
    }

    Ok(())
}
