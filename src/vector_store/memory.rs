//! In-memory vector store implementation.
//!
//! Useful for testing; collections are plain vectors scanned with cosine
//! similarity.

use super::{cosine_similarity, IndexedChunk, ScoredChunk, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<IndexedChunk>>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Number of records in a collection.
    pub fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().unwrap();
        collections.get(collection).map_or(0, Vec::len)
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn ensure_collection(&self, collection: &str, _dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        collections.entry(collection.to_string()).or_default();
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[IndexedChunk]) -> Result<usize> {
        let mut collections = self.collections.write().unwrap();
        let stored = collections.entry(collection.to_string()).or_default();
        stored.extend_from_slice(records);
        Ok(records.len())
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let collections = self.collections.read().unwrap();

        let mut results: Vec<ScoredChunk> = collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .map(|record| ScoredChunk {
                        content: record.content.clone(),
                        source: record.source.clone(),
                        score: cosine_similarity(query, &record.embedding),
                    })
                    .collect()
            })
            .unwrap_or_default();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }
}
