//! HistoryReader - read façade over stored versions
//!
//! Entries are denormalized with the author's display profile so a history
//! view needs no second lookup.

use std::sync::Arc;

use serde::Serialize;

use super::errors::{VersionError, VersionResult};
use super::types::{DocumentId, Version};
use crate::documents::{UserDirectory, UserProfile};
use crate::storage::VersionStore;

/// Author display fields attached to a history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl From<UserProfile> for Author {
    fn from(profile: UserProfile) -> Self {
        Self {
            name: profile.name,
            email: profile.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub version: Version,
    pub author: Option<Author>,
}

pub struct HistoryReader {
    store: Arc<dyn VersionStore>,
    users: Arc<dyn UserDirectory>,
}

impl HistoryReader {
    pub fn new(store: Arc<dyn VersionStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { store, users }
    }

    /// Most-recent-first history capped at `limit`.
    pub fn get_history(
        &self,
        document_id: DocumentId,
        limit: usize,
    ) -> VersionResult<Vec<HistoryEntry>> {
        self.get_history_before(document_id, None, limit)
    }

    /// Next page of history: versions numbered below `before`.
    pub fn get_history_before(
        &self,
        document_id: DocumentId,
        before: Option<u64>,
        limit: usize,
    ) -> VersionResult<Vec<HistoryEntry>> {
        let versions = self.store.list_before(document_id, before, limit)?;
        Ok(versions.into_iter().map(|v| self.entry(v)).collect())
    }

    pub fn get_version(&self, document_id: DocumentId, number: u64) -> VersionResult<Version> {
        self.store
            .get(document_id, number)?
            .ok_or_else(|| VersionError::version_not_found(document_id, number))
    }

    /// Single version with its author attached.
    pub fn get_entry(&self, document_id: DocumentId, number: u64) -> VersionResult<HistoryEntry> {
        self.get_version(document_id, number).map(|v| self.entry(v))
    }

    fn entry(&self, version: Version) -> HistoryEntry {
        let author = self.users.lookup(version.changed_by()).map(Author::from);
        HistoryEntry { version, author }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::InMemoryUserDirectory;
    use crate::storage::InMemoryVersionStore;
    use crate::versioning::types::{ChangeType, DocumentState, UserId, Visibility};
    use chrono::Utc;

    #[test]
    fn test_entries_carry_known_authors_only() {
        let store = Arc::new(InMemoryVersionStore::new());
        let known = UserProfile {
            id: UserId::new(),
            name: "Grace".into(),
            email: "grace@example.com".into(),
        };
        let users = Arc::new(InMemoryUserDirectory::with_users([known.clone()]));
        let doc = DocumentId::new();

        for (n, who) in [(1, known.id), (2, UserId::new())] {
            store
                .append(Version::snapshot(
                    doc,
                    n,
                    &DocumentState::new("T", "", Visibility::Private),
                    who,
                    ChangeType::Updated,
                    "",
                    Utc::now(),
                ))
                .unwrap();
        }

        let reader = HistoryReader::new(store, users);
        let history = reader.get_history(doc, 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].version.number(), 2);
        assert!(history[0].author.is_none());
        assert_eq!(history[1].author.as_ref().unwrap().name, "Grace");

        let json = serde_json::to_value(&history[1]).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["author"]["email"], "grace@example.com");
    }

    #[test]
    fn test_missing_version_is_not_found() {
        let reader = HistoryReader::new(
            Arc::new(InMemoryVersionStore::new()),
            Arc::new(InMemoryUserDirectory::new()),
        );
        let err = reader.get_version(DocumentId::new(), 1).unwrap_err();
        assert!(matches!(err, VersionError::VersionNotFound { version: 1, .. }));
    }
}
