//! CLI module for folio
//!
//! Provides command-line interface for:
//! - init: Create the data directory and an empty version log
//! - serve: Boot the store and serve the HTTP API
//! - history: Print a document's history from the version log

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_service, history, init, run_command, serve};
pub use config::{Config, StorageBackend};
pub use errors::{CliError, CliResult};
pub use io::{write_lines, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args().command)
}
