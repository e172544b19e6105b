//! ChangeDetector - decides whether a proposed state warrants a new version
//!
//! Fields are compared by exact value equality. The detector is pure: it
//! never touches storage and never allocates a version number.

use super::text;
use super::types::{ChangeType, DocumentState, Version};

/// Outcome of comparing a proposed state with the latest version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeDecision {
    /// Proposed state equals the latest version; no version may be created.
    NoChange,
    /// A version must be created with this classification.
    Change {
        change_type: ChangeType,
        summary: String,
    },
}

impl ChangeDecision {
    pub fn is_change(&self) -> bool {
        matches!(self, ChangeDecision::Change { .. })
    }
}

/// Which tracked fields differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangedFields {
    pub title: bool,
    pub content: bool,
    pub visibility: bool,
}

impl ChangedFields {
    pub fn between(latest: &Version, proposed: &DocumentState) -> Self {
        Self {
            title: latest.title() != proposed.title,
            content: latest.content() != proposed.content,
            visibility: latest.visibility() != proposed.visibility,
        }
    }

    pub fn count(&self) -> usize {
        [self.title, self.content, self.visibility]
            .iter()
            .filter(|changed| **changed)
            .count()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector;

impl ChangeDetector {
    pub fn new() -> Self {
        Self
    }

    /// Compares `proposed` against `latest`.
    ///
    /// With no latest version the document is brand new and the decision is
    /// always `Created`, bypassing the no-op check.
    pub fn detect(&self, latest: Option<&Version>, proposed: &DocumentState) -> ChangeDecision {
        let latest = match latest {
            Some(latest) => latest,
            None => {
                return ChangeDecision::Change {
                    change_type: ChangeType::Created,
                    summary: ChangeType::Created.default_summary().to_string(),
                }
            }
        };

        let changed = ChangedFields::between(latest, proposed);
        let change_type = match (changed.count(), changed) {
            (0, _) => return ChangeDecision::NoChange,
            (1, ChangedFields { title: true, .. }) => ChangeType::TitleChanged,
            (1, ChangedFields { content: true, .. }) => ChangeType::ContentChanged,
            (1, _) => ChangeType::VisibilityChanged,
            _ => ChangeType::Updated,
        };

        ChangeDecision::Change {
            change_type,
            summary: summarize(latest, proposed, changed),
        }
    }
}

/// Phrases a content change by its word-count delta.
pub fn content_summary(old_content: &str, new_content: &str) -> String {
    let old_words = text::word_count(old_content) as i64;
    let new_words = text::word_count(new_content) as i64;
    let delta = new_words - old_words;

    if delta > 0 {
        format!("Added {} words", delta)
    } else if delta < 0 {
        format!("Removed {} words", -delta)
    } else {
        "Modified content".to_string()
    }
}

fn summarize(latest: &Version, proposed: &DocumentState, changed: ChangedFields) -> String {
    let mut parts = Vec::with_capacity(3);
    if changed.title {
        parts.push(ChangeType::TitleChanged.default_summary().to_string());
    }
    if changed.content {
        parts.push(content_summary(latest.content(), &proposed.content));
    }
    if changed.visibility {
        parts.push(format!("Visibility changed to {}", proposed.visibility));
    }
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versioning::types::{DocumentId, UserId, Visibility};
    use chrono::Utc;

    fn latest(title: &str, content: &str, visibility: Visibility) -> Version {
        Version::snapshot(
            DocumentId::new(),
            3,
            &DocumentState::new(title, content, visibility),
            UserId::new(),
            ChangeType::Updated,
            "",
            Utc::now(),
        )
    }

    fn change_type(decision: ChangeDecision) -> ChangeType {
        match decision {
            ChangeDecision::Change { change_type, .. } => change_type,
            ChangeDecision::NoChange => panic!("expected a change"),
        }
    }

    #[test]
    fn test_first_save_is_created() {
        let proposed = DocumentState::new("A", "", Visibility::Private);
        let decision = ChangeDetector::new().detect(None, &proposed);
        assert_eq!(change_type(decision), ChangeType::Created);
    }

    #[test]
    fn test_identical_state_is_no_change() {
        let v = latest("A", "<p>x</p>", Visibility::Shared);
        let decision = ChangeDetector::new().detect(Some(&v), &v.state());
        assert_eq!(decision, ChangeDecision::NoChange);
        assert!(!decision.is_change());
    }

    #[test]
    fn test_single_field_changes_are_specific() {
        let v = latest("A", "<p>x</p>", Visibility::Private);
        let detector = ChangeDetector::new();

        let mut s = v.state();
        s.title = "B".into();
        assert_eq!(change_type(detector.detect(Some(&v), &s)), ChangeType::TitleChanged);

        let mut s = v.state();
        s.content = "<p>y</p>".into();
        assert_eq!(change_type(detector.detect(Some(&v), &s)), ChangeType::ContentChanged);

        let mut s = v.state();
        s.visibility = Visibility::Public;
        assert_eq!(
            change_type(detector.detect(Some(&v), &s)),
            ChangeType::VisibilityChanged
        );
    }

    #[test]
    fn test_multiple_fields_are_updated() {
        let v = latest("A", "<p>x</p>", Visibility::Private);
        let proposed = DocumentState::new("B", "<p>x y</p>", Visibility::Private);
        match ChangeDetector::new().detect(Some(&v), &proposed) {
            ChangeDecision::Change {
                change_type,
                summary,
            } => {
                assert_eq!(change_type, ChangeType::Updated);
                assert_eq!(summary, "Title changed; Added 1 words");
            }
            ChangeDecision::NoChange => panic!("expected a change"),
        }
    }

    #[test]
    fn test_content_summaries() {
        assert_eq!(content_summary("<p>one two</p>", "<p>one two three</p>"), "Added 1 words");
        assert_eq!(content_summary("<p>a b c d</p>", "<p>a</p>"), "Removed 3 words");
        assert_eq!(content_summary("<p>a b</p>", "<p>c d</p>"), "Modified content");
    }

    #[test]
    fn test_markup_only_change_is_still_a_change() {
        let v = latest("A", "<p>same</p>", Visibility::Private);
        let proposed = DocumentState::new("A", "<div>same</div>", Visibility::Private);
        match ChangeDetector::new().detect(Some(&v), &proposed) {
            ChangeDecision::Change { summary, .. } => assert_eq!(summary, "Modified content"),
            ChangeDecision::NoChange => panic!("markup change must not be suppressed"),
        }
    }
}
