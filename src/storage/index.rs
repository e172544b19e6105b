//! In-memory version index shared by both store backends
//!
//! Each document maps to its versions in ascending order. Because numbering
//! is gap-free, version `n` always sits at position `n - 1`.

use std::collections::HashMap;

use super::errors::{StorageError, StorageResult};
use crate::versioning::{DocumentId, Version};

#[derive(Debug, Default)]
pub struct VersionIndex {
    chains: HashMap<DocumentId, Vec<Version>>,
}

impl VersionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that `version` is exactly the next number for its document.
    pub fn check_append(&self, version: &Version) -> StorageResult<()> {
        let document_id = version.document_id();
        let max = self.max_version(document_id);
        let attempted = version.number();

        if attempted >= 1 && attempted <= max {
            return Err(StorageError::duplicate_version(
                &document_id.to_string(),
                attempted,
            ));
        }
        if attempted != max + 1 {
            return Err(StorageError::version_gap(
                &document_id.to_string(),
                attempted,
                max + 1,
            ));
        }
        Ok(())
    }

    /// Inserts after `check_append` has passed.
    pub fn insert(&mut self, version: Version) {
        self.chains
            .entry(version.document_id())
            .or_default()
            .push(version);
    }

    pub fn get(&self, document_id: DocumentId, number: u64) -> Option<&Version> {
        if number == 0 {
            return None;
        }
        self.chains
            .get(&document_id)
            .and_then(|chain| chain.get((number - 1) as usize))
    }

    pub fn max_version(&self, document_id: DocumentId) -> u64 {
        self.chains
            .get(&document_id)
            .map(|chain| chain.len() as u64)
            .unwrap_or(0)
    }

    /// Most-recent-first, strictly below `before` when given, capped at `limit`.
    pub fn list_before(
        &self,
        document_id: DocumentId,
        before: Option<u64>,
        limit: usize,
    ) -> Vec<Version> {
        let chain = match self.chains.get(&document_id) {
            Some(chain) => chain,
            None => return Vec::new(),
        };

        let upper = match before {
            Some(b) => (b.saturating_sub(1) as usize).min(chain.len()),
            None => chain.len(),
        };

        chain[..upper].iter().rev().take(limit).cloned().collect()
    }

    pub fn document_ids(&self) -> Vec<DocumentId> {
        let mut ids: Vec<_> = self.chains.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Total number of stored versions across all documents.
    pub fn len(&self) -> usize {
        self.chains.values().map(Vec::len).sum()
    }
}
