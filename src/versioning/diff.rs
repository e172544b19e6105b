//! DiffEngine - field-level comparison of two stored versions
//!
//! Only whole-value equality and count deltas are reported. There is no
//! line-level or structural diff of content markup.
//!
//! The diff is directional: `compare(a, b)` and `compare(b, a)` have old and
//! new swapped and count deltas negated.

use std::sync::Arc;

use serde::Serialize;

use super::errors::VersionResult;
use super::history::HistoryReader;
use super::types::{DocumentId, Version, Visibility};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff<T> {
    pub old: T,
    pub new: T,
    pub changed: bool,
}

impl<T: PartialEq> FieldDiff<T> {
    fn of(old: T, new: T) -> Self {
        let changed = old != new;
        Self { old, new, changed }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDiff {
    pub old: String,
    pub new: String,
    pub changed: bool,
    pub word_count_diff: i64,
    pub character_count_diff: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDiff {
    pub document_id: DocumentId,
    pub from_version: u64,
    pub to_version: u64,
    pub title: FieldDiff<String>,
    pub content: ContentDiff,
    pub visibility: FieldDiff<Visibility>,
}

impl VersionDiff {
    /// Diff from `a` (old) to `b` (new).
    pub fn between(a: &Version, b: &Version) -> Self {
        Self {
            document_id: a.document_id(),
            from_version: a.number(),
            to_version: b.number(),
            title: FieldDiff::of(a.title().to_string(), b.title().to_string()),
            content: ContentDiff {
                old: a.content().to_string(),
                new: b.content().to_string(),
                changed: a.content() != b.content(),
                word_count_diff: b.word_count() as i64 - a.word_count() as i64,
                character_count_diff: b.character_count() as i64 - a.character_count() as i64,
            },
            visibility: FieldDiff::of(a.visibility(), b.visibility()),
        }
    }

    pub fn has_changes(&self) -> bool {
        self.title.changed || self.content.changed || self.visibility.changed
    }
}

pub struct DiffEngine {
    history: Arc<HistoryReader>,
}

impl DiffEngine {
    pub fn new(history: Arc<HistoryReader>) -> Self {
        Self { history }
    }

    /// Compares version `a` to version `b` of one document.
    ///
    /// Fails with `VersionNotFound` naming whichever version is missing.
    pub fn compare(&self, document_id: DocumentId, a: u64, b: u64) -> VersionResult<VersionDiff> {
        let from = self.history.get_version(document_id, a)?;
        let to = self.history.get_version(document_id, b)?;
        Ok(VersionDiff::between(&from, &to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versioning::types::{ChangeType, DocumentState, UserId};
    use chrono::Utc;

    fn version(number: u64, title: &str, content: &str, visibility: Visibility) -> Version {
        Version::snapshot(
            DocumentId::new(),
            number,
            &DocumentState::new(title, content, visibility),
            UserId::new(),
            ChangeType::Updated,
            "",
            Utc::now(),
        )
    }

    #[test]
    fn test_content_growth_is_positive() {
        let a = version(1, "A", "<p>one two</p>", Visibility::Private);
        let b = version(2, "A", "<p>one two three</p>", Visibility::Private);
        let diff = VersionDiff::between(&a, &b);

        assert!(!diff.title.changed);
        assert!(diff.content.changed);
        assert_eq!(diff.content.word_count_diff, 1);
        assert_eq!(diff.content.character_count_diff, 6);
        assert!(!diff.visibility.changed);
    }

    #[test]
    fn test_reverse_direction_negates() {
        let a = version(1, "A", "<p>one</p>", Visibility::Private);
        let b = version(2, "B", "<p>one two three</p>", Visibility::Public);
        let forward = VersionDiff::between(&a, &b);
        let backward = VersionDiff::between(&b, &a);

        assert_eq!(forward.content.old, backward.content.new);
        assert_eq!(forward.content.new, backward.content.old);
        assert_eq!(forward.content.word_count_diff, -backward.content.word_count_diff);
        assert_eq!(
            forward.content.character_count_diff,
            -backward.content.character_count_diff
        );
        assert_eq!(forward.visibility.old, backward.visibility.new);
    }

    #[test]
    fn test_same_version_has_no_changes() {
        let a = version(1, "A", "<p>x</p>", Visibility::Shared);
        let diff = VersionDiff::between(&a, &a);
        assert!(!diff.has_changes());
        assert_eq!(diff.content.word_count_diff, 0);
    }

    #[test]
    fn test_serialized_shape() {
        let a = version(1, "A", "", Visibility::Private);
        let b = version(2, "A", "<p>x</p>", Visibility::Public);
        let json = serde_json::to_value(VersionDiff::between(&a, &b)).unwrap();
        assert_eq!(json["content"]["wordCountDiff"], 1);
        assert_eq!(json["visibility"]["new"], "public");
        assert_eq!(json["fromVersion"], 1);
    }
}
