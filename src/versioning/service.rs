//! VersionService - the operations the document CRUD layer calls
//!
//! Writes run inside the document's lock as one transaction:
//! read latest → detect → conditionally commit. Reads take no document lock.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::detector::{ChangeDecision, ChangeDetector};
use super::diff::{DiffEngine, VersionDiff};
use super::errors::{VersionError, VersionResult};
use super::factory::{Committed, VersionFactory};
use super::history::{HistoryEntry, HistoryReader};
use super::locks::DocumentLocks;
use super::restore::{RestoreCoordinator, RestoreOutcome};
use super::types::{ChangeType, DocumentId, DocumentState, UserId, Version};
use super::validation::{validate_state, HistoryLimits};
use crate::documents::{
    Document, DocumentRepository, InMemoryDocumentRepository, InMemoryUserDirectory,
    UserDirectory,
};
use crate::observability::{Event, MetricsRegistry};
use crate::storage::{InMemoryVersionStore, VersionStore};

/// Result of `update_document`: the live document and the version created,
/// if the update changed anything.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    pub document: Document,
    pub version: Option<Version>,
}

pub struct VersionService {
    store: Arc<dyn VersionStore>,
    documents: Arc<dyn DocumentRepository>,
    detector: ChangeDetector,
    factory: Arc<VersionFactory>,
    history: Arc<HistoryReader>,
    diff: DiffEngine,
    restore: RestoreCoordinator,
    limits: HistoryLimits,
    metrics: Arc<MetricsRegistry>,
}

impl VersionService {
    pub fn new(
        store: Arc<dyn VersionStore>,
        documents: Arc<dyn DocumentRepository>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        let locks = Arc::new(DocumentLocks::new());
        let factory = Arc::new(VersionFactory::new(
            Arc::clone(&store),
            Arc::clone(&documents),
            locks,
        ));
        let history = Arc::new(HistoryReader::new(Arc::clone(&store), users));
        let diff = DiffEngine::new(Arc::clone(&history));
        let restore = RestoreCoordinator::new(
            Arc::clone(&factory),
            Arc::clone(&history),
            Arc::clone(&documents),
        );

        Self {
            store,
            documents,
            detector: ChangeDetector::new(),
            factory,
            history,
            diff,
            restore,
            limits: HistoryLimits::default(),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Fully in-memory service with an empty user directory.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryVersionStore::new()),
            Arc::new(InMemoryDocumentRepository::new()),
            Arc::new(InMemoryUserDirectory::new()),
        )
    }

    pub fn with_limits(mut self, limits: HistoryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    pub fn limits(&self) -> HistoryLimits {
        self.limits
    }

    // ==================
    // Writes
    // ==================

    /// Registers a new document and records version 1.
    pub fn create_document(&self, state: DocumentState, user: UserId) -> VersionResult<Committed> {
        self.validate(&state)?;
        let id = DocumentId::new();

        let committed = self.factory.locks().with_document(id, |guard| {
            self.documents.insert(Document::new(id, user, &state))?;
            match self
                .factory
                .commit(guard, id, &state, user, ChangeType::Created, None)
            {
                Ok(committed) => Ok(committed),
                Err(e) => {
                    self.documents.remove(id)?;
                    Err(e)
                }
            }
        })?;

        self.metrics.increment_documents_created();
        self.metrics.increment_versions_created();
        info!(event = %Event::DocumentCreated, document_id = %id, user = %user, "document created");
        Ok(committed)
    }

    /// Records version 1 for a document the caller has just created.
    pub fn create_initial_version(
        &self,
        document_id: DocumentId,
        state: DocumentState,
        user: UserId,
    ) -> VersionResult<Version> {
        self.validate(&state)?;

        let committed = self.factory.locks().with_document(document_id, |guard| {
            if self.store.max_version(document_id)? > 0 {
                return Err(VersionError::InvalidState(format!(
                    "document {} already has version history",
                    document_id
                )));
            }
            self.factory
                .commit(guard, document_id, &state, user, ChangeType::Created, None)
        })?;

        self.metrics.increment_versions_created();
        Ok(committed.version)
    }

    /// Records a version if `proposed` differs from the latest one.
    ///
    /// Returns `None` when nothing changed. A document with no history yet
    /// always gets version 1.
    pub fn record_change_if_any(
        &self,
        document_id: DocumentId,
        proposed: DocumentState,
        user: UserId,
    ) -> VersionResult<Option<Version>> {
        Ok(self
            .update_document(document_id, proposed, user)?
            .version)
    }

    /// `record_change_if_any`, also returning the live document.
    pub fn update_document(
        &self,
        document_id: DocumentId,
        proposed: DocumentState,
        user: UserId,
    ) -> VersionResult<UpdateOutcome> {
        self.validate(&proposed)?;

        let outcome = self.factory.locks().with_document(document_id, |guard| {
            let document = self
                .documents
                .get(document_id)?
                .ok_or(VersionError::DocumentNotFound(document_id))?;
            let document = self.factory.catch_up(guard, document)?;
            let latest = self.store.latest(document_id)?;

            match self.detector.detect(latest.as_ref(), &proposed) {
                ChangeDecision::NoChange => Ok(UpdateOutcome {
                    document,
                    version: None,
                }),
                ChangeDecision::Change {
                    change_type,
                    summary,
                } => {
                    let committed = self.factory.commit(
                        guard,
                        document_id,
                        &proposed,
                        user,
                        change_type,
                        Some(summary),
                    )?;
                    Ok(UpdateOutcome {
                        document: committed.document,
                        version: Some(committed.version),
                    })
                }
            }
        })?;

        if outcome.version.is_some() {
            self.metrics.increment_versions_created();
        } else {
            self.metrics.increment_noop_saves();
            debug!(event = %Event::NoOpSave, document_id = %document_id, "update matched latest version");
        }
        Ok(outcome)
    }

    /// Re-applies version `target` as a new version.
    pub fn restore_version(
        &self,
        document_id: DocumentId,
        target: u64,
        user: UserId,
    ) -> VersionResult<RestoreOutcome> {
        let outcome = self.restore.restore(document_id, target, user)?;
        self.metrics.increment_restores();
        self.metrics.increment_versions_created();
        Ok(outcome)
    }

    // ==================
    // Reads
    // ==================

    pub fn get_document(&self, document_id: DocumentId) -> VersionResult<Document> {
        self.documents
            .get(document_id)?
            .ok_or(VersionError::DocumentNotFound(document_id))
    }

    /// Most-recent-first history. `None` uses the configured page size.
    pub fn list_versions(
        &self,
        document_id: DocumentId,
        limit: Option<usize>,
    ) -> VersionResult<Vec<HistoryEntry>> {
        self.list_versions_before(document_id, None, limit)
    }

    /// History page of versions numbered below `before`.
    pub fn list_versions_before(
        &self,
        document_id: DocumentId,
        before: Option<u64>,
        limit: Option<usize>,
    ) -> VersionResult<Vec<HistoryEntry>> {
        let limit = self.limits.resolve(limit)?;
        self.ensure_document(document_id)?;
        let entries = self
            .history
            .get_history_before(document_id, before, limit)?;
        self.metrics.increment_history_reads();
        Ok(entries)
    }

    pub fn get_version(&self, document_id: DocumentId, number: u64) -> VersionResult<HistoryEntry> {
        self.ensure_document(document_id)?;
        self.history.get_entry(document_id, number)
    }

    pub fn compare_versions(
        &self,
        document_id: DocumentId,
        a: u64,
        b: u64,
    ) -> VersionResult<VersionDiff> {
        self.ensure_document(document_id)?;
        let diff = self.diff.compare(document_id, a, b)?;
        self.metrics.increment_diffs();
        debug!(
            event = %Event::VersionsCompared,
            document_id = %document_id,
            from = a,
            to = b,
            "versions compared"
        );
        Ok(diff)
    }

    fn ensure_document(&self, document_id: DocumentId) -> VersionResult<()> {
        if self.documents.exists(document_id)? {
            Ok(())
        } else {
            Err(VersionError::DocumentNotFound(document_id))
        }
    }

    fn validate(&self, state: &DocumentState) -> VersionResult<()> {
        validate_state(state).map_err(|e| {
            self.metrics.increment_rejected_writes();
            warn!(event = %Event::WriteRejected, error = %e, "write rejected");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versioning::types::Visibility;

    fn state(title: &str, content: &str) -> DocumentState {
        DocumentState::new(title, content, Visibility::Private)
    }

    #[test]
    fn test_create_document_records_version_one() {
        let service = VersionService::in_memory();
        let committed = service
            .create_document(state("A", "<p>one two</p>"), UserId::new())
            .unwrap();

        assert_eq!(committed.version.number(), 1);
        assert_eq!(committed.version.change_type(), ChangeType::Created);
        assert_eq!(committed.document.current_version, 1);
        assert_eq!(service.metrics().snapshot().documents_created, 1);
    }

    #[test]
    fn test_invalid_state_never_reaches_store() {
        let service = VersionService::in_memory();
        let err = service.create_document(state("", "x"), UserId::new()).unwrap_err();
        assert!(matches!(err, VersionError::Validation(_)));
        assert_eq!(service.metrics().snapshot().rejected_writes, 1);
        assert_eq!(service.metrics().snapshot().versions_created, 0);
    }

    #[test]
    fn test_initial_version_only_once() {
        let documents = Arc::new(InMemoryDocumentRepository::new());
        let service = VersionService::new(
            Arc::new(InMemoryVersionStore::new()),
            documents.clone(),
            Arc::new(InMemoryUserDirectory::new()),
        );
        let id = DocumentId::new();
        let user = UserId::new();
        documents.insert(Document::new(id, user, &state("A", ""))).unwrap();

        let v1 = service.create_initial_version(id, state("A", ""), user).unwrap();
        assert_eq!(v1.number(), 1);

        let err = service.create_initial_version(id, state("A", ""), user).unwrap_err();
        assert!(matches!(err, VersionError::InvalidState(_)));
    }

    #[test]
    fn test_update_without_history_creates_version_one() {
        let documents = Arc::new(InMemoryDocumentRepository::new());
        let service = VersionService::new(
            Arc::new(InMemoryVersionStore::new()),
            documents.clone(),
            Arc::new(InMemoryUserDirectory::new()),
        );
        let id = DocumentId::new();
        let user = UserId::new();
        documents.insert(Document::new(id, user, &state("A", ""))).unwrap();

        let v = service
            .record_change_if_any(id, state("A", ""), user)
            .unwrap()
            .unwrap();
        assert_eq!(v.number(), 1);
        assert_eq!(v.change_type(), ChangeType::Created);
    }

    #[test]
    fn test_reads_on_unknown_document_are_not_found() {
        let service = VersionService::in_memory();
        let id = DocumentId::new();
        assert!(matches!(
            service.list_versions(id, None),
            Err(VersionError::DocumentNotFound(_))
        ));
        assert!(matches!(
            service.get_version(id, 1),
            Err(VersionError::DocumentNotFound(_))
        ));
        assert!(matches!(
            service.compare_versions(id, 1, 2),
            Err(VersionError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let service = VersionService::in_memory();
        let doc = service.create_document(state("A", ""), UserId::new()).unwrap();
        let err = service.list_versions(doc.document.id, Some(0)).unwrap_err();
        assert!(matches!(err, VersionError::Validation(_)));
    }

    #[test]
    fn test_failed_writes_leave_no_lock_slots() {
        let service = VersionService::in_memory();
        let user = UserId::new();
        for _ in 0..50 {
            let id = DocumentId::new();
            assert!(service.record_change_if_any(id, state("A", "x"), user).is_err());
            assert!(service.restore_version(id, 1, user).is_err());
        }
        assert!(service.factory.locks().is_empty());

        let doc = service.create_document(state("A", ""), user).unwrap();
        service
            .record_change_if_any(doc.document.id, state("A", "y"), user)
            .unwrap();
        assert!(service.factory.locks().is_empty());
    }
}
