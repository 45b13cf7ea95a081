//! Paragraph-aware text chunker.
//!
//! Splits extracted document text into [`Chunk`]s bounded by a token budget.
//! Paragraphs (`\n\n`-separated) are packed greedily; a paragraph larger than
//! the budget is broken on word boundaries. Token counts are approximated at
//! four characters per token.
//!
//! ```rust
//! use docqa_core::chunk::chunk_text;
//!
//! let chunks = chunk_text("notes.md", "Intro.\n\nDetails.", 700);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].source, "notes.md");
//! ```

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Approximate characters per token.
const CHARS_PER_TOKEN: usize = 4;

/// A retrievable unit of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: String,
    /// Origin document identifier, carried into citations.
    pub source: String,
    /// Position within the source, contiguous from 0.
    pub index: usize,
    pub text: String,
    /// Hex SHA-256 of `text`.
    pub hash: String,
}

/// Split `text` into chunks of at most `max_tokens` (approximate).
///
/// Blank text yields no chunks. Indices are contiguous from 0. A single word
/// longer than the budget becomes its own oversized chunk rather than being
/// cut mid-word.
pub fn chunk_text(source: &str, text: &str, max_tokens: usize) -> Vec<Chunk> {
    let max_chars = max_tokens.max(1) * CHARS_PER_TOKEN;
    let mut pieces: Vec<String> = Vec::new();
    let mut buf = String::new();

    for para in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let para_len = para.chars().count();
        if para_len > max_chars {
            flush(&mut buf, &mut pieces);
            split_words(para, max_chars, &mut pieces);
            continue;
        }
        let sep = if buf.is_empty() { 0 } else { 2 };
        if buf.chars().count() + sep + para_len > max_chars {
            flush(&mut buf, &mut pieces);
        }
        if !buf.is_empty() {
            buf.push_str("\n\n");
        }
        buf.push_str(para);
    }
    flush(&mut buf, &mut pieces);

    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| make_chunk(source, index, text))
        .collect()
}

fn flush(buf: &mut String, pieces: &mut Vec<String>) {
    if !buf.is_empty() {
        pieces.push(std::mem::take(buf));
    }
}

fn split_words(para: &str, max_chars: usize, pieces: &mut Vec<String>) {
    let mut buf = String::new();
    let mut buf_chars = 0usize;
    for word in para.split_whitespace() {
        let word_chars = word.chars().count();
        if buf_chars > 0 && buf_chars + 1 + word_chars > max_chars {
            pieces.push(std::mem::take(&mut buf));
            buf_chars = 0;
        }
        if buf_chars > 0 {
            buf.push(' ');
            buf_chars += 1;
        }
        buf.push_str(word);
        buf_chars += word_chars;
    }
    flush(&mut buf, pieces);
}

fn make_chunk(source: &str, index: usize, text: String) -> Chunk {
    let hash = format!("{:x}", Sha256::digest(text.as_bytes()));
    Chunk {
        id: Uuid::new_v4().to_string(),
        source: source.to_string(),
        index,
        text,
        hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_text_single_chunk() {
        let chunks = chunk_text("a.txt", "Hello, world!", 700);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "Hello, world!");
    }

    #[test]
    fn blank_text_has_no_chunks() {
        assert!(chunk_text("a.txt", "", 700).is_empty());
        assert!(chunk_text("a.txt", "  \n\n \n\n", 700).is_empty());
    }

    #[test]
    fn paragraphs_packed_under_limit() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let chunks = chunk_text("a.txt", text, 700);
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].text,
            "First paragraph.\n\nSecond paragraph.\n\nThird paragraph."
        );
    }

    #[test]
    fn paragraphs_split_over_limit() {
        let text = "This is paragraph one.\n\nThis is paragraph two.\n\nThis is paragraph three.";
        let chunks = chunk_text("a.txt", text, 6);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].text, "This is paragraph two.");
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
        }
    }

    #[test]
    fn long_paragraph_split_on_words() {
        let para = (0..100).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let chunks = chunk_text("a.txt", &para, 5);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.text.chars().count() <= 20, "chunk too long: {}", c.text);
            assert!(!c.text.starts_with(' ') && !c.text.ends_with(' '));
        }
        let rejoined = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
        assert_eq!(rejoined, para);
    }

    #[test]
    fn multibyte_text_is_counted_in_chars() {
        let text = "日本語のテキスト ".repeat(20);
        let chunks = chunk_text("a.txt", &text, 10);
        assert!(!chunks.is_empty());
        for c in &chunks {
            assert!(c.text.chars().count() <= 40);
        }
    }

    #[test]
    fn hashes_are_deterministic() {
        let a = chunk_text("a.txt", "Alpha\n\nBeta", 1);
        let b = chunk_text("a.txt", "Alpha\n\nBeta", 1);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.hash, y.hash);
            assert_ne!(x.id, y.id);
        }
    }
}
