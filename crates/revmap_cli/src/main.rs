//! revmap CLI
//!
//! Command-line tools for revmap map databases.
//!
//! # Commands
//!
//! - `init` - Install the map relations in a database file
//! - `inspect` - Display the latest signed root of a map
//! - `get` - Read leaves as of a revision
//! - `verify` - Check the signed root history of a map

mod commands;

use clap::{Parser, Subcommand};
use revmap_core::{Config, MapId, MapStorage, RootOrdering};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// revmap command-line map database tools.
#[derive(Parser)]
#[command(name = "revmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Map ID to operate on
    #[arg(global = true, short, long, default_value = "1")]
    map: i64,

    /// Select the latest root by timestamp instead of revision
    #[arg(global = true, long)]
    by_timestamp: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the map relations
    Init,

    /// Display the latest signed root
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Read leaves as of a revision
    Get {
        /// Keys to read, hex-encoded hashes unless --labels is given
        #[arg(required = true)]
        keys: Vec<String>,

        /// Revision to read at (defaults to the latest root)
        #[arg(short, long)]
        revision: Option<i64>,

        /// Treat keys as labels and hash them with SHA-256
        #[arg(short, long)]
        labels: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check the signed root history
    Verify,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let ordering = if cli.by_timestamp {
        RootOrdering::Timestamp
    } else {
        RootOrdering::Revision
    };
    let map_id = MapId::new(cli.map);

    match cli.command {
        Commands::Init => {
            let path = cli.path.ok_or("Database path required for init")?;
            commands::init::run(&path)?;
        }
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Database path required for inspect")?;
            let storage = open_existing(&path, map_id, ordering)?;
            commands::inspect::run(&storage, &format)?;
        }
        Commands::Get {
            keys,
            revision,
            labels,
            format,
        } => {
            let path = cli.path.ok_or("Database path required for get")?;
            let storage = open_existing(&path, map_id, ordering)?;
            commands::get::run(&storage, &keys, revision, labels, &format)?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or("Database path required for verify")?;
            let storage = open_existing(&path, map_id, ordering)?;
            commands::verify::run(&storage)?;
        }
        Commands::Version => {
            println!("revmap CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("revmap Core v{}", revmap_core::VERSION);
        }
    }

    Ok(())
}

fn open_existing(
    path: &Path,
    map_id: MapId,
    ordering: RootOrdering,
) -> Result<MapStorage, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No database found at {:?}", path).into());
    }
    let config = Config::new().root_ordering(ordering);
    Ok(MapStorage::open(path, map_id, config)?)
}
