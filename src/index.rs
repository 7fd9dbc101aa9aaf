//! Index gateway: embedding plus vector store behind a collection handle.
//!
//! The gateway is the only writer and reader of the vector database. In
//! shared mode every ingestion batch lands in one process-wide collection,
//! whose handle is initialized exactly once; in per-session mode each batch
//! gets a collection of its own.

use crate::chunking::Chunk;
use crate::config::CollectionMode;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{IndexedChunk, ScoredChunk, VectorStore};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

/// Handle to a queryable named collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHandle {
    collection: String,
}

impl IndexHandle {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
        }
    }

    /// Name of the collection this handle points at.
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

/// Gateway to the vector index.
pub struct IndexGateway {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    mode: CollectionMode,
    base_collection: String,
    shared: OnceCell<IndexHandle>,
}

impl IndexGateway {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        mode: CollectionMode,
        base_collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            store,
            mode,
            base_collection: base_collection.into(),
            shared: OnceCell::new(),
        }
    }

    /// Handle a new ingestion batch should write into.
    ///
    /// Shared mode hands out one process-wide handle (initialized once,
    /// even under concurrent first requests); per-session mode derives a
    /// fresh collection name per batch.
    pub async fn handle_for_ingest(&self) -> IndexHandle {
        match self.mode {
            CollectionMode::Shared => self
                .shared
                .get_or_init(|| async { IndexHandle::new(self.base_collection.as_str()) })
                .await
                .clone(),
            CollectionMode::PerSession => {
                let name = format!("{}-{}", self.base_collection, Uuid::new_v4().simple());
                IndexHandle::new(name)
            }
        }
    }

    /// Bind to an existing collection by name without creating it.
    pub fn connect(&self, collection: &str) -> IndexHandle {
        IndexHandle::new(collection)
    }

    /// Embed chunks and write them into the handle's collection, creating
    /// the collection on first write. Returns the count written; an empty
    /// input is a no-op.
    pub async fn upsert(&self, handle: &IndexHandle, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        self.store
            .ensure_collection(handle.collection(), self.embedder.dimensions())
            .await?;

        let records: Vec<IndexedChunk> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk::from_chunk(chunk, embedding))
            .collect();

        let added = self.store.upsert(handle.collection(), &records).await?;
        info!("Indexed {} chunks into {}", added, handle.collection());
        Ok(added)
    }

    /// Embed the query and return the `limit` most similar stored chunks.
    pub async fn search(
        &self,
        handle: &IndexHandle,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let embedding = self.embedder.embed(query).await?;
        let results = self
            .store
            .search(handle.collection(), &embedding, limit)
            .await?;
        debug!(
            "Retrieved {} chunks from {} for query",
            results.len(),
            handle.collection()
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceMetadata;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;

    /// Deterministic embedder: maps text onto letter-frequency axes so
    /// identical texts are maximally similar.
    struct CharFrequencyEmbedder;

    #[async_trait]
    impl Embedder for CharFrequencyEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut vector = vec![0.0f32; 26];
            for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
                vector[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
            }
            Ok(vector)
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            26
        }
    }

    fn chunk(content: &str) -> Chunk {
        Chunk {
            content: content.to_string(),
            metadata: SourceMetadata::new("inline"),
        }
    }

    fn gateway(mode: CollectionMode) -> IndexGateway {
        IndexGateway::new(
            Arc::new(CharFrequencyEmbedder),
            Arc::new(MemoryVectorStore::new()),
            mode,
            "test-chunks",
        )
    }

    #[tokio::test]
    async fn test_upsert_empty_is_noop() {
        let gateway = gateway(CollectionMode::Shared);
        let handle = gateway.handle_for_ingest().await;
        assert_eq!(gateway.upsert(&handle, &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_self_similarity_round_trip() {
        let gateway = gateway(CollectionMode::Shared);
        let handle = gateway.handle_for_ingest().await;

        let chunks = vec![
            chunk("the sky is blue today"),
            chunk("completely unrelated zzz qqq xxx"),
        ];
        assert_eq!(gateway.upsert(&handle, &chunks).await.unwrap(), 2);

        let results = gateway
            .search(&handle, "the sky is blue today", 2)
            .await
            .unwrap();
        assert_eq!(results[0].content, "the sky is blue today");
    }

    #[tokio::test]
    async fn test_connect_twice_resolves_same_data() {
        let gateway = gateway(CollectionMode::Shared);
        let handle = gateway.handle_for_ingest().await;
        gateway
            .upsert(&handle, &[chunk("rust borrows and moves")])
            .await
            .unwrap();

        let first = gateway.connect(handle.collection());
        let second = gateway.connect(handle.collection());
        let a = gateway.search(&first, "rust borrows", 5).await.unwrap();
        let b = gateway.search(&second, "rust borrows", 5).await.unwrap();

        assert_eq!(a.len(), 1);
        assert_eq!(a[0].content, b[0].content);
    }

    #[tokio::test]
    async fn test_shared_mode_reuses_one_handle() {
        let gateway = gateway(CollectionMode::Shared);
        let first = gateway.handle_for_ingest().await;
        let second = gateway.handle_for_ingest().await;
        assert_eq!(first, second);
        assert_eq!(first.collection(), "test-chunks");
    }

    #[tokio::test]
    async fn test_per_session_mode_isolates_batches() {
        let gateway = gateway(CollectionMode::PerSession);
        let first = gateway.handle_for_ingest().await;
        let second = gateway.handle_for_ingest().await;
        assert_ne!(first, second);

        gateway
            .upsert(&first, &[chunk("alpha corpus text")])
            .await
            .unwrap();
        let other = gateway.search(&second, "alpha corpus text", 5).await.unwrap();
        assert!(other.is_empty());
    }
}
