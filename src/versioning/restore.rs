//! RestoreCoordinator - rolls a document forward to an earlier snapshot
//!
//! fetch target → validate exists → commit target state as a new version.
//!
//! History is never rewritten: the restore is itself appended as
//! `ChangeType::Updated` with a "Restored to version N" summary. Restoring
//! the current version still appends, since a restore is always an explicit
//! request. A missing target fails before anything is written.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::errors::{VersionError, VersionResult};
use super::factory::VersionFactory;
use super::history::HistoryReader;
use super::types::{ChangeType, DocumentId, UserId, Version};
use crate::documents::{Document, DocumentRepository};
use crate::observability::Event;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreOutcome {
    pub restored_version: Version,
    pub document: Document,
}

pub struct RestoreCoordinator {
    factory: Arc<VersionFactory>,
    history: Arc<HistoryReader>,
    documents: Arc<dyn DocumentRepository>,
}

impl RestoreCoordinator {
    pub fn new(
        factory: Arc<VersionFactory>,
        history: Arc<HistoryReader>,
        documents: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self {
            factory,
            history,
            documents,
        }
    }

    pub fn restore(
        &self,
        document_id: DocumentId,
        target: u64,
        user: UserId,
    ) -> VersionResult<RestoreOutcome> {
        let result = self.factory.locks().with_document(document_id, |guard| {
            if !self.documents.exists(document_id)? {
                return Err(VersionError::DocumentNotFound(document_id));
            }
            let target_version = self.history.get_version(document_id, target)?;

            let committed = self.factory.commit(
                guard,
                document_id,
                &target_version.state(),
                user,
                ChangeType::Updated,
                Some(format!("Restored to version {}", target)),
            )?;

            Ok(RestoreOutcome {
                restored_version: committed.version,
                document: committed.document,
            })
        });

        match &result {
            Ok(outcome) => info!(
                event = %Event::VersionRestored,
                document_id = %document_id,
                target_version = target,
                version = outcome.restored_version.number(),
                "document restored"
            ),
            Err(e) => warn!(
                event = %Event::RestoreAborted,
                document_id = %document_id,
                target_version = target,
                error = %e,
                "restore aborted"
            ),
        }
        result
    }
}
