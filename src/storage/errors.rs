//! Storage error types
//!
//! Error codes:
//! - FOLIO_STORAGE_IO_ERROR (ERROR severity)
//! - FOLIO_STORAGE_WRITE_FAILED (ERROR severity)
//! - FOLIO_STORAGE_READ_FAILED (ERROR severity)
//! - FOLIO_STORAGE_DUPLICATE_VERSION (ERROR severity)
//! - FOLIO_STORAGE_VERSION_GAP (ERROR severity)
//! - FOLIO_STORAGE_LOCK_POISONED (ERROR severity)
//! - FOLIO_DATA_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, server continues
    Error,
    /// The store cannot be trusted; the process must stop
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O failure
    IoError,
    /// Record append failed
    WriteFailed,
    /// Record read failed
    ReadFailed,
    /// (document_id, version) already present
    DuplicateVersion,
    /// Appended number is not max + 1
    VersionGap,
    /// An internal lock was poisoned by a panicking writer
    LockPoisoned,
    /// Checksum or framing failure
    DataCorruption,
}

impl StorageErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::IoError => "FOLIO_STORAGE_IO_ERROR",
            StorageErrorCode::WriteFailed => "FOLIO_STORAGE_WRITE_FAILED",
            StorageErrorCode::ReadFailed => "FOLIO_STORAGE_READ_FAILED",
            StorageErrorCode::DuplicateVersion => "FOLIO_STORAGE_DUPLICATE_VERSION",
            StorageErrorCode::VersionGap => "FOLIO_STORAGE_VERSION_GAP",
            StorageErrorCode::LockPoisoned => "FOLIO_STORAGE_LOCK_POISONED",
            StorageErrorCode::DataCorruption => "FOLIO_DATA_CORRUPTION",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    /// Whether the failure is an append rejected by the numbering rules.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StorageErrorCode::DuplicateVersion | StorageErrorCode::VersionGap
        )
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with code, message and optional context
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StorageError {
    fn new(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }

    fn with_source(mut self, source: io::Error) -> Self {
        self.source = Some(source);
        self
    }

    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self::new(StorageErrorCode::IoError, message).with_source(source)
    }

    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self::new(StorageErrorCode::WriteFailed, message).with_source(source)
    }

    pub fn write_failed_no_source(message: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::WriteFailed, message)
    }

    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self::new(StorageErrorCode::ReadFailed, message).with_source(source)
    }

    pub fn duplicate_version(document_id: &str, version: u64) -> Self {
        Self::new(
            StorageErrorCode::DuplicateVersion,
            format!("Version {} already exists", version),
        )
        .with_details(format!("document_id: {}", document_id))
    }

    pub fn version_gap(document_id: &str, attempted: u64, expected: u64) -> Self {
        Self::new(
            StorageErrorCode::VersionGap,
            format!("Attempted version {}, expected {}", attempted, expected),
        )
        .with_details(format!("document_id: {}", document_id))
    }

    pub fn lock_poisoned(what: &str) -> Self {
        Self::new(
            StorageErrorCode::LockPoisoned,
            format!("{} lock poisoned", what),
        )
    }

    pub fn data_corruption(message: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::DataCorruption, message)
    }

    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::DataCorruption, reason)
            .with_details(format!("byte_offset: {}", offset))
    }

    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Fatal errors mean the on-disk history can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
