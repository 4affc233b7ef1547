//! Vector store seam: upsert and nearest-neighbour search over chunk
//! embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A store of embedded chunks supporting similarity search.
///
/// Implementations must be safe for concurrent read-only searches; the
/// pipeline publishes a fully built store and never mutates it in place
/// afterwards.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace chunks by ID. Chunks must have embeddings set.
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()>;

    /// Return the `top_k` chunks most similar to `embedding`, ordered by
    /// descending score. Returns fewer than `top_k` results when fewer
    /// records exist.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// The number of records currently stored.
    async fn count(&self) -> usize;
}
