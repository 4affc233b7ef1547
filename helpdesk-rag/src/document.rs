//! Data types for documents, chunks, and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata key holding the originating file path of a document.
pub const META_SOURCE: &str = "source";

/// Metadata key holding the 1-based page number for multi-page formats.
pub const META_PAGE: &str = "page";

/// A source document produced by ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document (the source path, plus a page
    /// suffix for multi-page formats).
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata; always carries [`META_SOURCE`].
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with the given id and text, recording `source`
    /// metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: HashMap::from([(META_SOURCE.to_string(), source.into())]),
        }
    }

    /// The originating file path, if recorded.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(META_SOURCE).map(String::as_str)
    }
}

/// A segment of a [`Document`], the unit of retrieval.
///
/// Chunks are created by a [`Chunker`](crate::chunking::Chunker) with an
/// empty embedding; the embedding is attached when the index is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, `{document_id}_{chunk_index}`.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
    /// Metadata inherited from the parent document plus `chunk_index`.
    pub metadata: HashMap<String, String>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
}

impl Chunk {
    /// The originating file path inherited from the parent document.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(META_SOURCE).map(String::as_str)
    }
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}
