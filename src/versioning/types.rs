//! Version record and the value types it is built from
//!
//! A `Version` is a full snapshot of a document's tracked fields at one
//! point in its history. Snapshots are never deltas and never change after
//! construction.
//!
//! - Fields are private; only accessors are exposed
//! - Word and character counts are derived in the constructor
//! - `ChangeType` and `Visibility` are closed enums

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text;

/// Identity of a document owned by the surrounding CRUD system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parses the hyphenated textual form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an acting user. Display-only back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who may see a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Shared,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Shared => "shared",
            Visibility::Public => "public",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of the transition that produced a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// First version of a document.
    Created,
    /// More than one tracked field changed, or an explicit restore.
    Updated,
    TitleChanged,
    ContentChanged,
    VisibilityChanged,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Created => "created",
            ChangeType::Updated => "updated",
            ChangeType::TitleChanged => "title_changed",
            ChangeType::ContentChanged => "content_changed",
            ChangeType::VisibilityChanged => "visibility_changed",
        }
    }

    /// Summary used when the committer supplies none.
    pub fn default_summary(&self) -> &'static str {
        match self {
            ChangeType::Created => "Document created",
            ChangeType::Updated => "Document updated",
            ChangeType::TitleChanged => "Title changed",
            ChangeType::ContentChanged => "Modified content",
            ChangeType::VisibilityChanged => "Visibility changed",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tracked triple of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentState {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub visibility: Visibility,
}

impl DocumentState {
    pub fn new(title: impl Into<String>, content: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            visibility,
        }
    }
}

/// A single immutable document version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    document_id: DocumentId,
    version: u64,
    title: String,
    content: String,
    visibility: Visibility,
    changed_by: UserId,
    change_type: ChangeType,
    change_summary: String,
    word_count: u64,
    character_count: u64,
    created_at: DateTime<Utc>,
}

impl Version {
    /// Builds a snapshot of `state` as version `number` of `document_id`.
    ///
    /// Counts are derived here from the markup-stripped content.
    pub fn snapshot(
        document_id: DocumentId,
        number: u64,
        state: &DocumentState,
        changed_by: UserId,
        change_type: ChangeType,
        change_summary: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let metrics = text::TextMetrics::of(&state.content);
        Self {
            document_id,
            version: number,
            title: state.title.clone(),
            content: state.content.clone(),
            visibility: state.visibility,
            changed_by,
            change_type,
            change_summary: change_summary.into(),
            word_count: metrics.words,
            character_count: metrics.characters,
            created_at,
        }
    }

    #[inline]
    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    /// The version number (1-based).
    #[inline]
    pub fn number(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub fn changed_by(&self) -> UserId {
        self.changed_by
    }

    #[inline]
    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    #[inline]
    pub fn change_summary(&self) -> &str {
        &self.change_summary
    }

    #[inline]
    pub fn word_count(&self) -> u64 {
        self.word_count
    }

    #[inline]
    pub fn character_count(&self) -> u64 {
        self.character_count
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Copies the tracked triple back out of the snapshot.
    pub fn state(&self) -> DocumentState {
        DocumentState {
            title: self.title.clone(),
            content: self.content.clone(),
            visibility: self.visibility,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Version {
        Version::snapshot(
            DocumentId::new(),
            1,
            &DocumentState::new("A", "<p>Hello world</p>", Visibility::Private),
            UserId::new(),
            ChangeType::Created,
            "Document created",
            Utc::now(),
        )
    }

    #[test]
    fn test_snapshot_derives_counts() {
        let v = sample();
        assert_eq!(v.word_count(), 2);
        assert_eq!(v.character_count(), 11);
    }

    #[test]
    fn test_state_roundtrips_tracked_fields() {
        let v = sample();
        let state = v.state();
        assert_eq!(state.title, "A");
        assert_eq!(state.content, "<p>Hello world</p>");
        assert_eq!(state.visibility, Visibility::Private);
    }

    #[test]
    fn test_change_type_wire_names() {
        let json = serde_json::to_string(&ChangeType::VisibilityChanged).unwrap();
        assert_eq!(json, "\"visibility_changed\"");
        let parsed: ChangeType = serde_json::from_str("\"title_changed\"").unwrap();
        assert_eq!(parsed, ChangeType::TitleChanged);
    }

    #[test]
    fn test_unknown_visibility_rejected() {
        let result: Result<Visibility, _> = serde_json::from_str("\"secret\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_version_serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["changeType"], "created");
        assert_eq!(json["wordCount"], 2);
        assert!(json.get("documentId").is_some());
    }
}
