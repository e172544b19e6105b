//! VersionFactory - allocates numbers and commits version records
//!
//! The factory is the only component that appends to the store and the only
//! writer of `Document::current_version`. A commit requires a
//! `DocumentGuard`, so number allocation and the append form one critical
//! section per document.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use super::errors::{VersionError, VersionResult};
use super::locks::{DocumentGuard, DocumentLocks};
use super::types::{ChangeType, DocumentId, DocumentState, UserId, Version};
use crate::documents::{Document, DocumentRepository};
use crate::observability::Event;
use crate::storage::VersionStore;

/// A freshly appended version and the document as it stands after it.
#[derive(Debug, Clone)]
pub struct Committed {
    pub version: Version,
    pub document: Document,
}

pub struct VersionFactory {
    store: Arc<dyn VersionStore>,
    documents: Arc<dyn DocumentRepository>,
    locks: Arc<DocumentLocks>,
}

impl VersionFactory {
    pub fn new(
        store: Arc<dyn VersionStore>,
        documents: Arc<dyn DocumentRepository>,
        locks: Arc<DocumentLocks>,
    ) -> Self {
        Self {
            store,
            documents,
            locks,
        }
    }

    pub fn locks(&self) -> &DocumentLocks {
        &self.locks
    }

    /// Takes the document's lock and commits one version.
    pub fn create_version(
        &self,
        document_id: DocumentId,
        state: &DocumentState,
        user: UserId,
        change_type: ChangeType,
        summary: Option<String>,
    ) -> VersionResult<Version> {
        self.locks.with_document(document_id, |guard| {
            self.commit(guard, document_id, state, user, change_type, summary)
                .map(|committed| committed.version)
        })
    }

    /// Commits one version while the caller holds the document's lock.
    ///
    /// The record is appended first; the document is advanced only after the
    /// append succeeds, so `current_version` never names a missing version.
    /// If the append fails nothing is written. If the repository then fails,
    /// the durable record stays and the document lags behind it until
    /// `catch_up` runs on the next write.
    pub fn commit(
        &self,
        guard: &DocumentGuard,
        document_id: DocumentId,
        state: &DocumentState,
        user: UserId,
        change_type: ChangeType,
        summary: Option<String>,
    ) -> VersionResult<Committed> {
        guard.ensure_covers(document_id)?;

        if !self.documents.exists(document_id)? {
            return Err(VersionError::DocumentNotFound(document_id));
        }

        let number = self.store.max_version(document_id)? + 1;
        let summary = summary.unwrap_or_else(|| change_type.default_summary().to_string());
        let version = Version::snapshot(
            document_id,
            number,
            state,
            user,
            change_type,
            summary,
            Utc::now(),
        );

        self.store.append(version.clone())?;

        let document = self
            .documents
            .commit(document_id, state, number, version.created_at())
            .map_err(|e| {
                error!(
                    document_id = %document_id,
                    version = number,
                    error = %e,
                    "version appended but document not advanced"
                );
                e
            })?;

        info!(
            event = %Event::VersionCommitted,
            document_id = %document_id,
            version = number,
            change_type = %change_type,
            user = %user,
            "version committed"
        );

        Ok(Committed { version, document })
    }
}

impl VersionFactory {
    /// Advances a document that lags its stored history to the latest
    /// stored version. Returns the document unchanged otherwise.
    pub fn catch_up(&self, guard: &DocumentGuard, document: Document) -> VersionResult<Document> {
        guard.ensure_covers(document.id)?;

        let max = self.store.max_version(document.id)?;
        if document.current_version >= max {
            return Ok(document);
        }
        let latest = self
            .store
            .get(document.id, max)?
            .ok_or_else(|| VersionError::version_not_found(document.id, max))?;

        warn!(
            event = %Event::DocumentCaughtUp,
            document_id = %document.id,
            from = document.current_version,
            to = max,
            "document behind stored history"
        );
        self.documents
            .commit(document.id, &latest.state(), max, latest.created_at())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::InMemoryDocumentRepository;
    use crate::storage::InMemoryVersionStore;
    use crate::versioning::types::Visibility;

    fn setup() -> (VersionFactory, Arc<InMemoryDocumentRepository>, DocumentId) {
        let store = Arc::new(InMemoryVersionStore::new());
        let documents = Arc::new(InMemoryDocumentRepository::new());
        let id = DocumentId::new();
        documents
            .insert(Document::new(
                id,
                UserId::new(),
                &DocumentState::new("A", "", Visibility::Private),
            ))
            .unwrap();
        let factory = VersionFactory::new(store, documents.clone(), Arc::new(DocumentLocks::new()));
        (factory, documents, id)
    }

    #[test]
    fn test_numbers_start_at_one_and_increment() {
        let (factory, documents, id) = setup();
        let state = DocumentState::new("A", "<p>x</p>", Visibility::Private);
        let user = UserId::new();

        let v1 = factory
            .create_version(id, &state, user, ChangeType::Created, None)
            .unwrap();
        let v2 = factory
            .create_version(id, &state, user, ChangeType::Updated, Some("again".into()))
            .unwrap();

        assert_eq!(v1.number(), 1);
        assert_eq!(v1.change_summary(), "Document created");
        assert_eq!(v2.number(), 2);
        assert_eq!(v2.change_summary(), "again");
        assert_eq!(documents.get(id).unwrap().unwrap().current_version, 2);
    }

    #[test]
    fn test_missing_document_fails_without_append() {
        let (factory, _, _) = setup();
        let missing = DocumentId::new();
        let err = factory
            .create_version(
                missing,
                &DocumentState::new("A", "", Visibility::Private),
                UserId::new(),
                ChangeType::Created,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, VersionError::DocumentNotFound(id) if id == missing));
        assert_eq!(factory.store.max_version(missing).unwrap(), 0);
    }

    #[test]
    fn test_guard_for_other_document_rejected() {
        let (factory, _, id) = setup();
        let other = DocumentId::new();
        let result = factory.locks().with_document(other, |guard| {
            factory.commit(
                guard,
                id,
                &DocumentState::new("A", "", Visibility::Private),
                UserId::new(),
                ChangeType::Created,
                None,
            )
        });
        assert!(matches!(result, Err(VersionError::InvalidState(_))));
    }
}
