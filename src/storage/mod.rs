//! Version storage for folio
//!
//! An append-only, keyed store of immutable `Version` records.
//!
//! # Design Principles
//!
//! - Append-only (no updates, no deletes)
//! - Unique `(document_id, version)` enforced at append time
//! - Numbering per document is contiguous from 1
//! - Checksum-verified on every read of the durable log
//!
//! Two backends implement `VersionStore`: `InMemoryVersionStore` and
//! `FileVersionStore`.

mod checksum;
mod errors;
mod file;
mod index;
mod memory;
mod reader;
mod record;
mod writer;

pub use checksum::{compute_checksum, verify_checksum};
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use file::FileVersionStore;
pub use memory::InMemoryVersionStore;
pub use writer::{log_path, LOG_FILE_NAME};

use crate::versioning::{DocumentId, Version};

/// Page size used when the caller does not give one.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Keyed append-only store of version records.
///
/// Listings are finite snapshots: calling `list` again re-queries and may
/// observe versions appended in between.
pub trait VersionStore: Send + Sync {
    /// Appends a record.
    ///
    /// Fails with `DuplicateVersion` if the number already exists and with
    /// `VersionGap` if it is not exactly `max_version + 1`.
    fn append(&self, version: Version) -> StorageResult<()>;

    fn get(&self, document_id: DocumentId, number: u64) -> StorageResult<Option<Version>>;

    /// Most-recent-first listing of versions numbered below `before`.
    fn list_before(
        &self,
        document_id: DocumentId,
        before: Option<u64>,
        limit: usize,
    ) -> StorageResult<Vec<Version>>;

    /// Most-recent-first listing capped at `limit`.
    fn list(&self, document_id: DocumentId, limit: usize) -> StorageResult<Vec<Version>> {
        self.list_before(document_id, None, limit)
    }

    /// Highest stored number, or 0 when the document has no versions.
    fn max_version(&self, document_id: DocumentId) -> StorageResult<u64>;

    fn latest(&self, document_id: DocumentId) -> StorageResult<Option<Version>> {
        match self.max_version(document_id)? {
            0 => Ok(None),
            n => self.get(document_id, n),
        }
    }

    /// Every document with at least one version.
    fn document_ids(&self) -> StorageResult<Vec<DocumentId>>;
}
