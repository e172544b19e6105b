//! Durable version store backed by a single append-only log
//!
//! On open the whole log is scanned, every checksum verified and the index
//! rebuilt. A log that fails verification, or whose numbering is not
//! contiguous per document, is refused. The store does not attempt repair.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use tracing::{error, info};

use super::errors::{StorageError, StorageResult};
use super::index::VersionIndex;
use super::reader::RecordReader;
use super::writer::{log_path, RecordWriter};
use super::VersionStore;
use crate::observability::Event;
use crate::versioning::{DocumentId, Version};

pub struct FileVersionStore {
    path: PathBuf,
    writer: Mutex<RecordWriter>,
    index: RwLock<VersionIndex>,
}

impl FileVersionStore {
    /// Opens (creating if needed) the log under `data_dir`.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let writer = RecordWriter::open(data_dir)?;
        let path = writer.path().to_path_buf();

        let index = match Self::rebuild_index(&path) {
            Ok(index) => index,
            Err(e) => {
                error!(
                    event = %Event::StoreCorruption,
                    path = %path.display(),
                    error = %e,
                    "version log failed verification"
                );
                return Err(e);
            }
        };

        info!(
            event = %Event::StoreOpened,
            path = %path.display(),
            documents = index.document_ids().len(),
            versions = index.len(),
            "version log opened"
        );

        Ok(Self {
            path,
            writer: Mutex::new(writer),
            index: RwLock::new(index),
        })
    }

    /// Whether a log already exists under `data_dir`.
    pub fn exists(data_dir: &Path) -> bool {
        log_path(data_dir).exists()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rebuild_index(path: &Path) -> StorageResult<VersionIndex> {
        let mut index = VersionIndex::new();
        let mut reader = RecordReader::open(path)?;

        loop {
            let offset = reader.current_offset();
            let version = match reader.read_next()? {
                Some(version) => version,
                None => break,
            };
            index
                .check_append(&version)
                .map_err(|e| StorageError::corruption_at_offset(offset, e.message().to_string()))?;
            index.insert(version);
        }

        Ok(index)
    }
}

impl VersionStore for FileVersionStore {
    fn append(&self, version: Version) -> StorageResult<()> {
        // The writer lock orders check, disk append and index insert.
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::lock_poisoned("version log writer"))?;

        {
            let index = self
                .index
                .read()
                .map_err(|_| StorageError::lock_poisoned("version index"))?;
            index.check_append(&version)?;
        }

        writer.append(&version)?;

        let mut index = self
            .index
            .write()
            .map_err(|_| StorageError::lock_poisoned("version index"))?;
        index.insert(version);
        Ok(())
    }

    fn get(&self, document_id: DocumentId, number: u64) -> StorageResult<Option<Version>> {
        let index = self
            .index
            .read()
            .map_err(|_| StorageError::lock_poisoned("version index"))?;
        Ok(index.get(document_id, number).cloned())
    }

    fn list_before(
        &self,
        document_id: DocumentId,
        before: Option<u64>,
        limit: usize,
    ) -> StorageResult<Vec<Version>> {
        let index = self
            .index
            .read()
            .map_err(|_| StorageError::lock_poisoned("version index"))?;
        Ok(index.list_before(document_id, before, limit))
    }

    fn max_version(&self, document_id: DocumentId) -> StorageResult<u64> {
        let index = self
            .index
            .read()
            .map_err(|_| StorageError::lock_poisoned("version index"))?;
        Ok(index.max_version(document_id))
    }

    fn document_ids(&self) -> StorageResult<Vec<DocumentId>> {
        let index = self
            .index
            .read()
            .map_err(|_| StorageError::lock_poisoned("version index"))?;
        Ok(index.document_ids())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versioning::{ChangeType, DocumentState, UserId, Visibility};
    use chrono::Utc;
    use tempfile::TempDir;

    fn version(document_id: DocumentId, number: u64, content: &str) -> Version {
        Version::snapshot(
            document_id,
            number,
            &DocumentState::new("Doc", content, Visibility::Private),
            UserId::new(),
            ChangeType::ContentChanged,
            "",
            Utc::now(),
        )
    }

    #[test]
    fn test_reopen_restores_index() {
        let temp = TempDir::new().unwrap();
        let doc = DocumentId::new();
        {
            let store = FileVersionStore::open(temp.path()).unwrap();
            store.append(version(doc, 1, "<p>a</p>")).unwrap();
            store.append(version(doc, 2, "<p>a b</p>")).unwrap();
        }

        let store = FileVersionStore::open(temp.path()).unwrap();
        assert_eq!(store.max_version(doc).unwrap(), 2);
        assert_eq!(store.get(doc, 2).unwrap().unwrap().content(), "<p>a b</p>");
    }

    #[test]
    fn test_rejected_append_leaves_log_untouched() {
        let temp = TempDir::new().unwrap();
        let doc = DocumentId::new();
        let store = FileVersionStore::open(temp.path()).unwrap();
        store.append(version(doc, 1, "x")).unwrap();
        let len_before = std::fs::metadata(store.path()).unwrap().len();

        assert!(store.append(version(doc, 1, "y")).is_err());
        assert!(store.append(version(doc, 3, "y")).is_err());

        let len_after = std::fs::metadata(store.path()).unwrap().len();
        assert_eq!(len_before, len_after);
    }

    #[test]
    fn test_retry_after_failed_append_reopens_cleanly() {
        let temp = TempDir::new().unwrap();
        let doc = DocumentId::new();
        {
            let store = FileVersionStore::open(temp.path()).unwrap();
            store.append(version(doc, 1, "x")).unwrap();

            // v2's frame reaches the file but the append reports failure
            store.writer.lock().unwrap().fail_next_append();
            assert!(store.append(version(doc, 2, "y")).is_err());
            assert_eq!(store.max_version(doc).unwrap(), 1);

            store.append(version(doc, 2, "y")).unwrap();
        }

        let store = FileVersionStore::open(temp.path()).unwrap();
        assert_eq!(store.max_version(doc).unwrap(), 2);
        assert_eq!(store.get(doc, 2).unwrap().unwrap().content(), "y");
    }
}
