//! Persisted flat vector index with cosine-similarity search.
//!
//! [`FlatVectorIndex`] keeps every record in memory behind a
//! `tokio::sync::RwLock` and persists the whole record set as a single JSON
//! file, written atomically (temp file + rename) so a partially written
//! index is never observable. Rebuilding produces a brand-new index value;
//! a published index is only ever read.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{HelpdeskError, Result};
use crate::vectorstore::VectorStore;

/// On-disk representation of a [`FlatVectorIndex`].
#[derive(Serialize, Deserialize)]
struct IndexFile {
    dimensions: usize,
    records: Vec<Chunk>,
}

/// An in-memory vector index with cosine-similarity search and wholesale
/// JSON persistence.
#[derive(Debug)]
pub struct FlatVectorIndex {
    dimensions: usize,
    records: RwLock<HashMap<String, Chunk>>,
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl FlatVectorIndex {
    /// Create an empty index for embeddings of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, records: RwLock::new(HashMap::new()) }
    }

    /// The dimensionality of the stored embeddings.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Build an index from chunks, batch-embedding their texts.
    ///
    /// # Errors
    ///
    /// Returns [`HelpdeskError::Embedding`] if the provider fails; no
    /// partial index is produced.
    pub async fn build(
        mut chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = provider.embed_batch(&texts).await?;

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        let index = Self::new(provider.dimensions());
        index.upsert(&chunks).await?;
        info!(records = chunks.len(), dimensions = index.dimensions, "built vector index");
        Ok(index)
    }

    /// Persist the whole index to `path` as JSON, atomically.
    ///
    /// Records are written sorted by ID so the file is deterministic for a
    /// given record set.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut records: Vec<Chunk> = {
            let guard = self.records.read().await;
            guard.values().cloned().collect()
        };
        records.sort_by(|a, b| a.id.cmp(&b.id));

        let file = IndexFile { dimensions: self.dimensions, records };
        let bytes = serde_json::to_vec(&file).map_err(|e| HelpdeskError::Index {
            message: format!("failed to serialize index: {e}"),
        })?;

        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;

        info!(path = %path.display(), records = file.records.len(), "saved vector index");
        Ok(())
    }

    /// Load a previously saved index from `path`.
    ///
    /// # Errors
    ///
    /// - [`HelpdeskError::IndexNotFound`] if no file exists at `path` —
    ///   recoverable, callers may fall back to a fresh build.
    /// - [`HelpdeskError::Index`] if the file exists but cannot be read or
    ///   parsed. This is surfaced verbatim, never papered over by a rebuild.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HelpdeskError::IndexNotFound { path: path.to_path_buf() });
            }
            Err(e) => {
                return Err(HelpdeskError::Index {
                    message: format!("failed to read index at {}: {e}", path.display()),
                });
            }
        };

        let file: IndexFile = serde_json::from_slice(&bytes).map_err(|e| HelpdeskError::Index {
            message: format!("failed to parse index at {}: {e}", path.display()),
        })?;

        let index = Self::new(file.dimensions);
        index.upsert(&file.records).await?;
        info!(path = %path.display(), records = file.records.len(), "loaded vector index");
        Ok(index)
    }
}

#[async_trait]
impl VectorStore for FlatVectorIndex {
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
        for chunk in chunks {
            if chunk.embedding.len() != self.dimensions {
                return Err(HelpdeskError::Index {
                    message: format!(
                        "chunk '{}' has embedding dimension {}, index expects {}",
                        chunk.id,
                        chunk.embedding.len(),
                        self.dimensions
                    ),
                });
            }
        }

        let mut records = self.records.write().await;
        for chunk in chunks {
            records.insert(chunk.id.clone(), chunk.clone());
        }
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let records = self.records.read().await;

        let mut scored: Vec<SearchResult> = records
            .values()
            .map(|chunk| SearchResult {
                score: cosine_similarity(&chunk.embedding, embedding),
                chunk: chunk.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        debug!(results = scored.len(), top_k, "searched vector index");
        Ok(scored)
    }

    async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}
