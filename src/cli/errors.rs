//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit. `code()` is the
//! stable identifier printed ahead of the message.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::storage::StorageError;
use crate::versioning::{DocumentId, VersionError};

#[derive(Debug, Error)]
pub enum CliError {
    // ==================
    // Shared by all commands
    // ==================
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==================
    // init
    // ==================
    #[error("Data directory {} already initialized", .0.display())]
    AlreadyInitialized(PathBuf),

    // ==================
    // serve
    // ==================
    #[error("Data directory {} not initialized. Run 'folio init' first.", .0.display())]
    NotInitialized(PathBuf),

    #[error("Version log could not be opened: {0}")]
    Store(#[from] StorageError),

    #[error("Boot failed: {0}")]
    Boot(String),

    #[error("HTTP server failed: {0}")]
    Serve(#[source] io::Error),

    // ==================
    // history
    // ==================
    #[error("Invalid document id '{0}'")]
    InvalidDocumentId(String),

    #[error("No history for document {0}")]
    NoHistory(DocumentId),

    #[error(transparent)]
    Version(#[from] VersionError),
}

impl CliError {
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "FOLIO_CLI_CONFIG_ERROR",
            CliError::Io(_) | CliError::Json(_) => "FOLIO_CLI_IO_ERROR",
            CliError::AlreadyInitialized(_) => "FOLIO_CLI_ALREADY_INITIALIZED",
            CliError::NotInitialized(_) => "FOLIO_CLI_NOT_INITIALIZED",
            CliError::Store(_) | CliError::Boot(_) => "FOLIO_CLI_BOOT_FAILED",
            CliError::Serve(_) => "FOLIO_CLI_SERVE_FAILED",
            CliError::InvalidDocumentId(_) => "FOLIO_CLI_INVALID_DOCUMENT_ID",
            CliError::NoHistory(_) => "FOLIO_CLI_NO_HISTORY",
            CliError::Version(_) => "FOLIO_CLI_VERSION_ERROR",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
