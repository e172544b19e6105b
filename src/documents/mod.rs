//! # Documents
//!
//! The live document the version engine snapshots. Documents belong to the
//! surrounding CRUD system; the engine only reads them and commits new
//! tracked state together with `current_version`.

pub mod users;

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::observability::Event;
use crate::storage::VersionStore;
use crate::versioning::{
    DocumentId, DocumentState, UserId, VersionError, VersionResult, Visibility,
};

pub use users::{InMemoryUserDirectory, UserDirectory, UserProfile};

/// Live document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub visibility: Visibility,
    /// Highest version number recorded for this document; 0 before the first.
    pub current_version: u64,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// A document that has not been versioned yet.
    pub fn new(id: DocumentId, owner: UserId, state: &DocumentState) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: state.title.clone(),
            content: state.content.clone(),
            visibility: state.visibility,
            current_version: 0,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> DocumentState {
        DocumentState {
            title: self.title.clone(),
            content: self.content.clone(),
            visibility: self.visibility,
        }
    }
}

/// Document repository trait
///
/// Abstracts the caller's document-update interface.
pub trait DocumentRepository: Send + Sync {
    fn get(&self, id: DocumentId) -> VersionResult<Option<Document>>;

    /// Registers a new document. Fails if the id is taken.
    fn insert(&self, document: Document) -> VersionResult<()>;

    /// Drops a document that never received its first version.
    fn remove(&self, id: DocumentId) -> VersionResult<()>;

    /// Writes tracked state and `current_version` in one step.
    fn commit(
        &self,
        id: DocumentId,
        state: &DocumentState,
        current_version: u64,
        at: DateTime<Utc>,
    ) -> VersionResult<Document>;

    fn exists(&self, id: DocumentId) -> VersionResult<bool> {
        Ok(self.get(id)?.is_some())
    }
}

/// In-memory document repository
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<HashMap<DocumentId, Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> VersionError {
    VersionError::InvalidState("document repository lock poisoned".to_string())
}

impl DocumentRepository for InMemoryDocumentRepository {
    fn get(&self, id: DocumentId) -> VersionResult<Option<Document>> {
        let documents = self.documents.read().map_err(|_| poisoned())?;
        Ok(documents.get(&id).cloned())
    }

    fn insert(&self, document: Document) -> VersionResult<()> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        if documents.contains_key(&document.id) {
            return Err(VersionError::InvalidState(format!(
                "document {} already exists",
                document.id
            )));
        }
        documents.insert(document.id, document);
        Ok(())
    }

    fn remove(&self, id: DocumentId) -> VersionResult<()> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        documents.remove(&id);
        Ok(())
    }

    fn commit(
        &self,
        id: DocumentId,
        state: &DocumentState,
        current_version: u64,
        at: DateTime<Utc>,
    ) -> VersionResult<Document> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        let document = documents
            .get_mut(&id)
            .ok_or(VersionError::DocumentNotFound(id))?;

        document.title = state.title.clone();
        document.content = state.content.clone();
        document.visibility = state.visibility;
        document.current_version = current_version;
        document.updated_at = at;
        Ok(document.clone())
    }
}

/// Rebuilds live documents from stored history.
///
/// Each document's latest version is its live state; version 1 supplies the
/// owner and creation time. Documents already present in `repo` are left
/// alone. Returns the number of documents inserted.
pub fn recover_documents(
    store: &dyn VersionStore,
    repo: &dyn DocumentRepository,
) -> VersionResult<usize> {
    let mut recovered = 0;

    for id in store.document_ids()? {
        if repo.exists(id)? {
            continue;
        }
        let first = store
            .get(id, 1)?
            .ok_or_else(|| VersionError::version_not_found(id, 1))?;
        let latest = store
            .latest(id)?
            .ok_or_else(|| VersionError::InvalidState(format!("document {} has no latest version", id)))?;

        repo.insert(Document {
            id,
            title: latest.title().to_string(),
            content: latest.content().to_string(),
            visibility: latest.visibility(),
            current_version: latest.number(),
            owner: first.changed_by(),
            created_at: first.created_at(),
            updated_at: latest.created_at(),
        })?;
        recovered += 1;
    }

    info!(event = %Event::DocumentsRecovered, documents = recovered, "live documents rebuilt");
    Ok(recovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryVersionStore;
    use crate::versioning::{ChangeType, Version};

    #[test]
    fn test_commit_missing_document() {
        let repo = InMemoryDocumentRepository::new();
        let state = DocumentState::new("A", "", Visibility::Private);
        let err = repo
            .commit(DocumentId::new(), &state, 1, Utc::now())
            .unwrap_err();
        assert!(matches!(err, VersionError::DocumentNotFound(_)));
    }

    #[test]
    fn test_insert_twice_rejected() {
        let repo = InMemoryDocumentRepository::new();
        let doc = Document::new(
            DocumentId::new(),
            UserId::new(),
            &DocumentState::new("A", "", Visibility::Private),
        );
        repo.insert(doc.clone()).unwrap();
        assert!(repo.insert(doc).is_err());
    }

    #[test]
    fn test_recover_uses_latest_state_and_first_author() {
        let store = InMemoryVersionStore::new();
        let id = DocumentId::new();
        let owner = UserId::new();
        let editor = UserId::new();

        store
            .append(Version::snapshot(
                id,
                1,
                &DocumentState::new("Draft", "<p>a</p>", Visibility::Private),
                owner,
                ChangeType::Created,
                "Document created",
                Utc::now(),
            ))
            .unwrap();
        store
            .append(Version::snapshot(
                id,
                2,
                &DocumentState::new("Final", "<p>a b</p>", Visibility::Public),
                editor,
                ChangeType::Updated,
                "",
                Utc::now(),
            ))
            .unwrap();

        let repo = InMemoryDocumentRepository::new();
        assert_eq!(recover_documents(&store, &repo).unwrap(), 1);

        let doc = repo.get(id).unwrap().unwrap();
        assert_eq!(doc.title, "Final");
        assert_eq!(doc.visibility, Visibility::Public);
        assert_eq!(doc.current_version, 2);
        assert_eq!(doc.owner, owner);

        // Second pass is a no-op.
        assert_eq!(recover_documents(&store, &repo).unwrap(), 0);
    }
}
