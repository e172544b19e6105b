//! Volatile version store

use std::sync::RwLock;

use super::errors::{StorageError, StorageResult};
use super::index::VersionIndex;
use super::VersionStore;
use crate::versioning::{DocumentId, Version};

/// In-memory store for tests and the `memory` backend.
#[derive(Debug, Default)]
pub struct InMemoryVersionStore {
    index: RwLock<VersionIndex>,
}

impl InMemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VersionStore for InMemoryVersionStore {
    fn append(&self, version: Version) -> StorageResult<()> {
        let mut index = self
            .index
            .write()
            .map_err(|_| StorageError::lock_poisoned("version index"))?;
        index.check_append(&version)?;
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
