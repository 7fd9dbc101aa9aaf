//! Vector store abstraction for Svar.
//!
//! Provides a trait-based interface over the external vector database. The
//! database owns the durable copy of every indexed chunk; nothing here
//! caches vectors.

mod memory;
mod qdrant;

pub use memory::MemoryVectorStore;
pub use qdrant::QdrantStore;

use crate::chunking::Chunk;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chunk as durably stored in a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    /// Unique record ID.
    pub id: Uuid,
    /// Text content of this chunk.
    pub content: String,
    /// Source label inherited from the original document.
    pub source: String,
    /// Diagnostic note inherited from normalization, if any.
    pub note: Option<String>,
    /// Embedding vector.
    pub embedding: Vec<f32>,
}

impl IndexedChunk {
    /// Pair a chunk with its embedding, minting a fresh record id.
    pub fn from_chunk(chunk: &Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: chunk.content.clone(),
            source: chunk.metadata.source.clone(),
            note: chunk.metadata.note.clone(),
            embedding,
        }
    }
}

/// A search hit with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// Stored chunk content.
    pub content: String,
    /// Source label stored with the chunk.
    pub source: String,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if it does not exist yet.
    async fn ensure_collection(&self, collection: &str, dimensions: usize) -> Result<()>;

    /// Write records into a collection; returns the number written.
    async fn upsert(&self, collection: &str, records: &[IndexedChunk]) -> Result<usize>;

    /// The `limit` nearest stored chunks by similarity, descending.
    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }
}
