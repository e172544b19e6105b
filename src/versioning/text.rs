//! Word and character metrics over rich-text markup
//!
//! Tags are removed with a plain `<...>` pattern; entities are left as-is.
//! Counts are taken over the stripped text.

use std::sync::OnceLock;

use regex::Regex;

static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();

fn tag_pattern() -> &'static Regex {
    TAG_PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"))
}

/// Removes every markup tag from `content`.
pub fn strip_markup(content: &str) -> String {
    tag_pattern().replace_all(content, "").into_owned()
}

/// Number of whitespace-delimited non-empty tokens after stripping markup.
pub fn word_count(content: &str) -> u64 {
    strip_markup(content).split_whitespace().count() as u64
}

/// Word count and length of the markup-stripped text in Unicode scalar
/// values, computed from a single strip pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextMetrics {
    pub words: u64,
    pub characters: u64,
}

impl TextMetrics {
    pub fn of(content: &str) -> Self {
        let stripped = strip_markup(content);
        Self {
            words: stripped.split_whitespace().count() as u64,
            characters: stripped.chars().count() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_counts() {
        assert_eq!(word_count("<p>Hello world</p>"), 2);
        assert_eq!(TextMetrics::of("<p>Hello world</p>").characters, 11);
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(TextMetrics::of(""), TextMetrics::default());
    }

    #[test]
    fn test_markup_only_content_has_no_words() {
        let m = TextMetrics::of("<p></p><br/>");
        assert_eq!(m.words, 0);
        assert_eq!(m.characters, 0);
    }

    #[test]
    fn test_tags_with_attributes_are_removed() {
        let content = r#"<h1 class="title">One</h1><p style="x">two three</p>"#;
        assert_eq!(strip_markup(content), "Onetwo three");
        assert_eq!(word_count(content), 2);
    }

    #[test]
    fn test_whitespace_runs_collapse_for_words_only() {
        let content = "<p>a   b\n\tc</p>";
        assert_eq!(word_count(content), 3);
        assert_eq!(TextMetrics::of(content).characters, 8);
    }

    #[test]
    fn test_multibyte_characters_counted_once() {
        assert_eq!(TextMetrics::of("<p>héllo</p>").characters, 5);
    }
}
