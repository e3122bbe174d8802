//! objdb CLI
//!
//! Command-line interface for a local objdb database.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use objdb::{Engine, Id, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// objdb CLI
#[derive(Parser, Debug)]
#[command(name = "objdb-cli")]
#[command(about = "CLI for the objdb storage engine")]
#[command(version)]
struct Args {
    /// Database directory
    #[arg(short, long, default_value = "./objdb_data")]
    path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new database (truncates an existing one)
    Create {
        /// Data region budget in MB
        #[arg(short = 'm', long, default_value = "1024")]
        data_mb: u64,

        /// Number of index node slots
        #[arg(short, long, default_value = "64")]
        index_capacity: u64,
    },

    /// Insert a value and print its id
    Insert {
        /// Use this id instead of a random one
        #[arg(long)]
        id: Option<Id>,

        /// The value to store
        value: String,
    },

    /// Read the value stored under an id
    Read {
        id: Id,
    },

    /// Replace the value stored under an id
    Update {
        id: Id,

        /// The new value
        value: String,
    },

    /// Delete an id
    Delete {
        id: Id,
    },

    /// Show space usage
    Stats,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Create {
            data_mb,
            index_capacity,
        } => {
            let engine = Engine::create_at(&args.path, data_mb.saturating_mul(1024 * 1024), index_capacity)?;
            engine.close()
        }
        Commands::Insert { id, value } => {
            let mut engine = Engine::open_at(&args.path)?;
            let id = match id {
                Some(id) => {
                    engine.insert(id, value.as_bytes())?;
                    id
                }
                None => engine.insert_new(value.as_bytes())?,
            };
            println!("{}", id);
            engine.close()
        }
        Commands::Read { id } => {
            let engine = Engine::open_at(&args.path)?;
            let data = engine.read(id)?;
            println!("{}", String::from_utf8_lossy(&data));
            Ok(())
        }
        Commands::Update { id, value } => {
            let mut engine = Engine::open_at(&args.path)?;
            engine.update(id, value.as_bytes())?;
            engine.close()
        }
        Commands::Delete { id } => {
            let mut engine = Engine::open_at(&args.path)?;
            engine.delete(id)?;
            engine.close()
        }
        Commands::Stats => {
            let engine = Engine::open_at(&args.path)?;
            let stats = engine.stats();
            println!("nodes: {}/{}", stats.nodes, stats.node_capacity);
            println!("data:  {}/{} bytes", stats.data_bytes, stats.data_capacity);
            Ok(())
        }
    }
}
