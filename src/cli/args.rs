//! CLI argument definitions using clap
//!
//! Commands:
//! - folio init --config <path>
//! - folio serve --config <path>
//! - folio history --config <path> --document <id> [--limit N]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// folio - immutable version history for collaborative documents
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new folio data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./folio.json")]
        config: PathBuf,
    },

    /// Start the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./folio.json")]
        config: PathBuf,
    },

    /// Print a document's history as JSON lines, newest first
    History {
        /// Path to configuration file
        #[arg(long, default_value = "./folio.json")]
        config: PathBuf,

        /// Document id (UUID)
        #[arg(long)]
        document: String,

        /// Maximum number of versions to print
        #[arg(long)]
        limit: Option<usize>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
