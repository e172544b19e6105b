//! # Versioning
//!
//! Immutable, gap-free version history for documents.
//!
//! Every committed document change becomes a numbered snapshot. Numbers are
//! allocated per document under that document's lock, so history is
//! strictly increasing from 1 with no gaps or duplicates. Restoring appends
//! a new version; nothing already recorded is rewritten or deleted.
//!
//! Flow for an update:
//!
//! ```text
//! validate → lock(document) → latest → detect → commit? → unlock
//! ```

pub mod detector;
pub mod diff;
pub mod errors;
pub mod factory;
pub mod history;
pub mod locks;
pub mod restore;
pub mod service;
pub mod text;
pub mod types;
pub mod validation;

pub use detector::{ChangeDecision, ChangeDetector};
pub use diff::{ContentDiff, DiffEngine, FieldDiff, VersionDiff};
pub use errors::{ErrorKind, VersionError, VersionResult};
pub use factory::{Committed, VersionFactory};
pub use history::{Author, HistoryEntry, HistoryReader};
pub use locks::{DocumentGuard, DocumentLocks};
pub use restore::{RestoreCoordinator, RestoreOutcome};
pub use service::{UpdateOutcome, VersionService};
pub use text::TextMetrics;
pub use types::{ChangeType, DocumentId, DocumentState, UserId, Version, Visibility};
pub use validation::{validate_state, HistoryLimits, MAX_TITLE_LEN};
