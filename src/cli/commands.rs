//! CLI command implementations
//!
//! `serve` boot order:
//! 1. Load config
//! 2. Install the log subscriber
//! 3. Open the version store (full checksum scan for the file backend)
//! 4. Rebuild live documents from history
//! 5. Serve HTTP
//!
//! Any failure before step 5 aborts the boot.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::info;

use super::args::Command;
use super::config::{Config, StorageBackend};
use super::errors::{CliError, CliResult};
use super::io::{write_lines, write_response};
use crate::documents::{recover_documents, InMemoryDocumentRepository, InMemoryUserDirectory};
use crate::http_server::HttpServer;
use crate::observability::{init_logging, Event};
use crate::storage::{log_path, FileVersionStore, InMemoryVersionStore, VersionStore};
use crate::versioning::{DocumentId, HistoryReader, VersionService};

/// Dispatch a parsed command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config } => serve(&config),
        Command::History {
            config,
            document,
            limit,
        } => history(&config, &document, limit),
    }
}

fn is_initialized(data_dir: &Path) -> bool {
    FileVersionStore::exists(data_dir)
}

/// Creates `<data_dir>/data/versions.dat`.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let data_dir = config.data_path()?;

    if is_initialized(data_dir) {
        return Err(CliError::AlreadyInitialized(data_dir.to_path_buf()));
    }

    let log = log_path(data_dir);
    if let Some(parent) = log.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CliError::Config(format!("Failed to create directory {:?}: {}", parent, e))
        })?;
    }
    fs::File::create(&log)?.sync_all()?;

    write_response(json!({
        "initialized": true,
        "path": log.display().to_string(),
    }))
}

pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    init_logging(&config.log_level, config.log_json);

    info!(event = %Event::BootStart, "boot starting");
    info!(
        event = %Event::ConfigLoaded,
        path = %config_path.display(),
        storage = ?config.storage,
        "configuration loaded"
    );

    let service = Arc::new(build_service(&config)?);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Boot(format!("Failed to create tokio runtime: {}", e)))?;

    info!(event = %Event::BootComplete, address = %config.http.bind_address(), "boot complete");

    let server = HttpServer::with_service(config.http.clone(), service);
    rt.block_on(server.start())
        .map_err(CliError::Serve)
}

/// Wires store, recovered documents and users into a service.
pub fn build_service(config: &Config) -> CliResult<VersionService> {
    let store: Arc<dyn VersionStore> = match config.storage {
        StorageBackend::Memory => Arc::new(InMemoryVersionStore::new()),
        StorageBackend::File => Arc::new(open_file_store(config)?),
    };

    let documents = Arc::new(InMemoryDocumentRepository::new());
    recover_documents(store.as_ref(), documents.as_ref())
        .map_err(|e| CliError::Boot(format!("Document recovery failed: {}", e)))?;

    let users = Arc::new(InMemoryUserDirectory::with_users(config.users.iter().cloned()));

    Ok(VersionService::new(store, documents, users).with_limits(config.history))
}

fn open_file_store(config: &Config) -> CliResult<FileVersionStore> {
    let data_dir = config.data_path()?;
    if !is_initialized(data_dir) {
        return Err(CliError::NotInitialized(data_dir.to_path_buf()));
    }
    Ok(FileVersionStore::open(data_dir)?)
}

/// Offline history dump from the file store.
pub fn history(config_path: &Path, document: &str, limit: Option<usize>) -> CliResult<()> {
    let config = Config::load(config_path)?;
    if config.storage != StorageBackend::File {
        return Err(CliError::Config(
            "history reads the file store; storage is \"memory\"".into(),
        ));
    }

    let document_id = DocumentId::parse(document)
        .map_err(|_| CliError::InvalidDocumentId(document.to_string()))?;
    let limit = config.history.resolve(limit)?;

    let store = Arc::new(open_file_store(&config)?);
    let users = Arc::new(InMemoryUserDirectory::with_users(config.users.iter().cloned()));
    let reader = HistoryReader::new(store, users);

    let entries = reader.get_history(document_id, limit)?;
    if entries.is_empty() {
        return Err(CliError::NoHistory(document_id));
    }

    write_lines(&mut std::io::stdout(), entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: serde_json::Value) -> std::path::PathBuf {
        let path = dir.path().join("folio.json");
        fs::write(&path, body.to_string()).unwrap();
        path
    }

    #[test]
    fn test_init_creates_log_once() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data-root");
        let config = write_config(&dir, json!({ "data_dir": data }));

        init(&config).unwrap();
        assert!(log_path(&data).exists());

        let err = init(&config).unwrap_err();
        assert_eq!(err.code(), "FOLIO_CLI_ALREADY_INITIALIZED");
    }

    #[test]
    fn test_file_service_requires_init() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: Some(dir.path().join("missing")),
            ..Config::default()
        };
        let err = build_service(&config).err().unwrap();
        assert_eq!(err.code(), "FOLIO_CLI_NOT_INITIALIZED");
    }

    #[test]
    fn test_build_service_recovers_documents() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, json!({ "data_dir": dir.path() }));
        init(&config_path).unwrap();
        let config = Config::load(&config_path).unwrap();

        let id = {
            let service = build_service(&config).unwrap();
            let created = service
                .create_document(
                    crate::versioning::DocumentState::new(
                        "Notes",
                        "<p>hello</p>",
                        crate::versioning::Visibility::Private,
                    ),
                    crate::versioning::UserId::new(),
                )
                .unwrap();
            created.document.id
        };

        let reopened = build_service(&config).unwrap();
        let document = reopened.get_document(id).unwrap();
        assert_eq!(document.title, "Notes");
        assert_eq!(document.current_version, 1);
    }

    #[test]
    fn test_history_rejects_memory_backend() {
        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, json!({ "storage": "memory" }));
        let err = history(&config, &DocumentId::new().to_string(), None).unwrap_err();
        assert_eq!(err.code(), "FOLIO_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_history_rejects_bad_document_id() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, json!({ "data_dir": dir.path() }));
        init(&config_path).unwrap();

        let err = history(&config_path, "not-a-uuid", None).unwrap_err();
        assert!(matches!(err, CliError::InvalidDocumentId(ref input) if input == "not-a-uuid"));

        let missing = DocumentId::new();
        let err = history(&config_path, &missing.to_string(), None).unwrap_err();
        assert!(matches!(err, CliError::NoHistory(id) if id == missing));
        assert_eq!(err.code(), "FOLIO_CLI_NO_HISTORY");
    }
}
