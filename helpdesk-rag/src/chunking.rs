//! Document chunking strategies.
//!
//! Two implementations of the [`Chunker`] trait:
//!
//! - [`RecursiveChunker`] — splits hierarchically by paragraphs, sentences,
//!   then words, falling back to hard character splitting
//! - [`FixedSizeChunker`] — splits by character count only
//!
//! Both are deterministic for a given document and configuration, and both
//! repeat the trailing `chunk_overlap` characters of a chunk at the start of
//! the next chunk from the same document.

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no
/// embeddings; embeddings are attached when the index is built.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Separator hierarchy tried by [`RecursiveChunker`], largest first.
const SEPARATORS: [&str; 5] = ["\n\n", ". ", "! ", "? ", " "];

fn make_chunk(document: &Document, index: usize, text: String) -> Chunk {
    let mut metadata = document.metadata.clone();
    metadata.insert("chunk_index".to_string(), index.to_string());
    Chunk {
        id: format!("{}_{index}", document.id),
        text,
        embedding: Vec::new(),
        metadata,
        document_id: document.id.clone(),
    }
}

/// The trailing `n` characters of `text`, on a char boundary.
fn tail_chars(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    let start = text.char_indices().rev().nth(n - 1).map_or(0, |(i, _)| i);
    &text[start..]
}

/// Hard character-count splitting with overlap.
fn split_by_chars(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size.saturating_sub(chunk_overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Split `text` by the first separator, merge the pieces into chunks of at
/// most `chunk_size` characters, and recurse with the next separator on any
/// piece that is still too large. Each chunk after the first starts with the
/// trailing `chunk_overlap` characters of its predecessor.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if text.chars().count() <= chunk_size || separators.is_empty() {
        return split_by_chars(text, chunk_size, chunk_overlap);
    }

    let separator = separators[0];
    let rest = &separators[1..];
    let segments: Vec<&str> = text.split_inclusive(separator).collect();

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for segment in segments {
        let segment_len = segment.chars().count();

        if current_len > 0 && current_len + segment_len > chunk_size {
            if current_len > chunk_size {
                chunks.extend(split_and_merge(&current, chunk_size, chunk_overlap, rest));
            } else {
                chunks.push(current.clone());
            }

            // Seed the next chunk with the trailing overlap of this one.
            let tail = tail_chars(&current, chunk_overlap).to_string();
            current.clear();
            current.push_str(&tail);
            current_len = tail.chars().count();
        }

        current.push_str(segment);
        current_len += segment_len;
    }

    if !current.is_empty() {
        if current_len > chunk_size {
            chunks.extend(split_and_merge(&current, chunk_size, chunk_overlap, rest));
        } else {
            chunks.push(current);
        }
    }

    chunks
}

/// Splits text hierarchically: paragraphs → sentences → words.
///
/// Prefers the largest separator that keeps a piece within `chunk_size`
/// characters; a piece no separator can reduce is split by raw character
/// count.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// `chunk_size` is the maximum number of characters per chunk and
    /// `chunk_overlap` the number repeated between consecutive chunks.
    /// Callers validate `chunk_overlap < chunk_size` up front; see
    /// [`AssistantConfig`](crate::config::AssistantConfig).
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        split_and_merge(&document.text, self.chunk_size, self.chunk_overlap, &SEPARATORS)
            .into_iter()
            .enumerate()
            .map(|(i, text)| make_chunk(document, i, text))
            .collect()
    }
}

/// Splits text into fixed-size chunks by character count with overlap.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker` with the given size and overlap in
    /// characters.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        split_by_chars(&document.text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .enumerate()
            .map(|(i, text)| make_chunk(document, i, text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn doc(text: &str) -> Document {
        Document::new("doc1", text, "doc1.txt")
    }

    #[test]
    fn fixed_size_repeats_overlap_at_boundaries() {
        let text: String = ('a'..='z').cycle().take(100).collect();
        let chunks = FixedSizeChunker::new(20, 5).chunk(&doc(&text));

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].text.chars().rev().take(5).collect::<Vec<_>>().into_iter().rev().collect();
            assert!(pair[1].text.starts_with(&tail));
        }
    }

    #[test]
    fn fixed_size_bounds_chunk_length() {
        let text: String = "x".repeat(95);
        let chunks = FixedSizeChunker::new(30, 10).chunk(&doc(&text));
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 30));
    }

    #[test]
    fn recursive_keeps_small_paragraphs_whole() {
        let text = "First paragraph here.\n\nSecond paragraph here.";
        let chunks = RecursiveChunker::new(200, 20).chunk(&doc(text));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
    }

    #[test]
    fn recursive_splits_on_sentences_with_overlap() {
        let text = "The sky is blue. Grass is green.";
        let chunks = RecursiveChunker::new(20, 5).chunk(&doc(text));

        assert!(chunks.len() >= 2);
        assert!(chunks.iter().any(|c| c.text.contains("Grass is green")));
        // Boundary content from the first chunk reappears in the second.
        let tail: String = chunks[0].text.chars().rev().take(5).collect::<Vec<_>>().into_iter().rev().collect();
        assert!(chunks[1].text.starts_with(&tail));
    }

    #[test]
    fn recursive_falls_back_to_hard_splitting() {
        let text = "y".repeat(120);
        let chunks = RecursiveChunker::new(40, 10).chunk(&doc(&text));
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 40));
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = "Alpha beta gamma. Delta epsilon zeta. Eta theta iota kappa lambda.";
        let chunker = RecursiveChunker::new(30, 8);
        let first: Vec<String> = chunker.chunk(&doc(text)).into_iter().map(|c| c.text).collect();
        let second: Vec<String> = chunker.chunk(&doc(text)).into_iter().map(|c| c.text).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn multibyte_text_does_not_panic() {
        let text = "héllo wörld. ".repeat(20);
        let chunks = RecursiveChunker::new(25, 5).chunk(&doc(&text));
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 25));
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        assert!(RecursiveChunker::new(100, 10).chunk(&doc("")).is_empty());
        assert!(FixedSizeChunker::new(100, 10).chunk(&doc("")).is_empty());
    }

    #[test]
    fn chunk_ids_and_metadata_record_position() {
        let text: String = "z".repeat(50);
        let chunks = FixedSizeChunker::new(20, 5).chunk(&doc(&text));
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.id, format!("doc1_{i}"));
            assert_eq!(chunk.metadata.get("chunk_index"), Some(&i.to_string()));
            assert_eq!(chunk.document_id, "doc1");
            assert_eq!(chunk.source(), Some("doc1.txt"));
        }
    }
}
