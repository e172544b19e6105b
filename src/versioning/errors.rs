//! # Versioning Errors
//!
//! Failures surfaced by every core operation. When a storage append fails
//! nothing has been written.

use thiserror::Error;

use super::types::DocumentId;
use crate::storage::StorageError;

/// Result type for versioning operations
pub type VersionResult<T> = Result<T, VersionError>;

/// Coarse classification used by callers to pick a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    ValidationFailure,
    Storage,
}

#[derive(Debug, Error)]
pub enum VersionError {
    // ==================
    // Not found
    // ==================
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("Version {version} not found for document {document_id}")]
    VersionNotFound { document_id: DocumentId, version: u64 },

    // ==================
    // Invariant violations
    // ==================
    #[error("Invalid state: {0}")]
    InvalidState(String),

    // ==================
    // Rejected input
    // ==================
    #[error("Validation failed: {0}")]
    Validation(String),

    // ==================
    // Storage
    // ==================
    #[error("{0}")]
    Storage(StorageError),
}

impl VersionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VersionError::DocumentNotFound(_) | VersionError::VersionNotFound { .. } => {
                ErrorKind::NotFound
            }
            VersionError::InvalidState(_) => ErrorKind::InvalidState,
            VersionError::Validation(_) => ErrorKind::ValidationFailure,
            VersionError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn version_not_found(document_id: DocumentId, version: u64) -> Self {
        VersionError::VersionNotFound {
            document_id,
            version,
        }
    }
}

impl From<StorageError> for VersionError {
    /// Numbering conflicts are invariant violations; everything else stays a
    /// storage failure.
    fn from(err: StorageError) -> Self {
        if err.code().is_conflict() {
            VersionError::InvalidState(err.to_string())
        } else {
            VersionError::Storage(err)
        }
    }
}
