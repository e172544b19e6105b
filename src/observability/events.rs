//! Observable events
//!
//! Every structured log line carries one of these as its `event` field.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Startup complete, ready to serve
    BootComplete,
    /// Configuration loaded
    ConfigLoaded,
    /// HTTP listener bound
    Serving,

    // Storage
    /// Version log opened and verified
    StoreOpened,
    /// Version log failed verification (FATAL)
    StoreCorruption,
    /// Live documents rebuilt from stored history
    DocumentsRecovered,
    /// A failed append was truncated off the log
    AppendRolledBack,
    /// A failed append could not be truncated; the writer refuses new records
    WriterFailed,

    // Writes
    /// New document registered
    DocumentCreated,
    /// A version record was appended
    VersionCommitted,
    /// An update matched the latest version and was suppressed
    NoOpSave,
    /// A write was rejected before reaching storage
    WriteRejected,
    /// A document behind its stored history was advanced to the latest version
    DocumentCaughtUp,

    // Restore
    /// Restore finished with a new version
    VersionRestored,
    /// Restore aborted without side effects
    RestoreAborted,

    // Reads
    /// Two versions were compared
    VersionsCompared,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "FOLIO_STARTUP_BEGIN",
            Event::BootComplete => "FOLIO_STARTUP_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::Serving => "FOLIO_SERVING",

            Event::StoreOpened => "VERSION_LOG_OPENED",
            Event::StoreCorruption => "VERSION_LOG_CORRUPTION",
            Event::DocumentsRecovered => "DOCUMENTS_RECOVERED",
            Event::AppendRolledBack => "APPEND_ROLLED_BACK",
            Event::WriterFailed => "VERSION_LOG_WRITER_FAILED",

            Event::DocumentCreated => "DOCUMENT_CREATED",
            Event::VersionCommitted => "VERSION_COMMITTED",
            Event::NoOpSave => "NOOP_SAVE",
            Event::WriteRejected => "WRITE_REJECTED",
            Event::DocumentCaughtUp => "DOCUMENT_CAUGHT_UP",

            Event::VersionRestored => "VERSION_RESTORED",
            Event::RestoreAborted => "RESTORE_ABORTED",

            Event::VersionsCompared => "VERSIONS_COMPARED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
