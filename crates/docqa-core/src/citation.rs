//! Source citations attached to assistant turns.

use serde::{Deserialize, Serialize};

use crate::engine::RetrievedPassage;

/// Maximum excerpt length, in characters, before truncation.
pub const MAX_EXCERPT_CHARS: usize = 200;

/// Appended to an excerpt that was cut at [`MAX_EXCERPT_CHARS`].
pub const CONTINUATION_MARKER: &str = "...";

/// Source id used when the engine did not report one.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// A reference to a retrieved passage. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    source_id: String,
    excerpt: String,
}

impl Citation {
    /// Build a citation, applying the source fallback and excerpt bound.
    pub fn new(source_id: Option<&str>, excerpt: &str) -> Self {
        let source_id = match source_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => UNKNOWN_SOURCE.to_string(),
        };
        Self {
            source_id,
            excerpt: truncate_excerpt(excerpt),
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }
}

impl From<&RetrievedPassage> for Citation {
    fn from(passage: &RetrievedPassage) -> Self {
        Citation::new(passage.source_id.as_deref(), &passage.excerpt)
    }
}

/// Cut `text` to [`MAX_EXCERPT_CHARS`] characters plus the continuation
/// marker. Text at or under the limit is returned unchanged.
pub fn truncate_excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], CONTINUATION_MARKER),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_excerpt_passes_through() {
        let text = "a".repeat(MAX_EXCERPT_CHARS);
        assert_eq!(truncate_excerpt(&text), text);
        assert_eq!(truncate_excerpt(""), "");
    }

    #[test]
    fn long_excerpt_is_cut_with_marker() {
        let text = "b".repeat(MAX_EXCERPT_CHARS + 1);
        let cut = truncate_excerpt(&text);
        assert_eq!(cut.chars().count(), MAX_EXCERPT_CHARS + CONTINUATION_MARKER.len());
        assert!(cut.ends_with(CONTINUATION_MARKER));
        assert!(cut.starts_with(&"b".repeat(MAX_EXCERPT_CHARS)));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_EXCERPT_CHARS);
        assert_eq!(truncate_excerpt(&text), text);

        let longer = "日".repeat(MAX_EXCERPT_CHARS + 10);
        let cut = truncate_excerpt(&longer);
        assert_eq!(cut, format!("{}...", "日".repeat(MAX_EXCERPT_CHARS)));
    }

    #[test]
    fn missing_or_blank_source_falls_back() {
        assert_eq!(Citation::new(None, "x").source_id(), UNKNOWN_SOURCE);
        assert_eq!(Citation::new(Some("  "), "x").source_id(), UNKNOWN_SOURCE);
        assert_eq!(Citation::new(Some("report.pdf"), "x").source_id(), "report.pdf");
    }

    #[test]
    fn from_passage() {
        let passage = RetrievedPassage::new(Some("a.md".into()), "z".repeat(300));
        let citation = Citation::from(&passage);
        assert_eq!(citation.source_id(), "a.md");
        assert!(citation.excerpt().ends_with("..."));
    }
}
