//! Pipeline orchestrator for Svar.
//!
//! Coordinates ingestion (normalize, chunk, embed, index, open a session)
//! and question answering (resolve the session, retrieve, generate).

use crate::chunking::{chunk_documents, ChunkingConfig};
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SvarError};
use crate::index::IndexGateway;
use crate::rag::{AnswerResult, RagEngine};
use crate::session::{MemorySessionStore, SessionStore};
use crate::source::{
    CaptionProvider, Extraction, IngestInput, Normalizer, SourceDocument, YtDlpCaptions,
};
use crate::vector_store::{QdrantStore, VectorStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the Svar pipeline.
pub struct Orchestrator {
    settings: Settings,
    normalizer: Normalizer,
    gateway: Arc<IndexGateway>,
    sessions: Arc<dyn SessionStore>,
}

impl Orchestrator {
    /// Create an orchestrator with the default providers.
    pub fn new(settings: Settings) -> Result<Self> {
        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let store = Arc::new(QdrantStore::new(
            &settings.vector_store.url,
            settings.vector_store.api_key.clone(),
        ));

        Self::with_components(
            settings,
            embedder,
            store,
            Arc::new(YtDlpCaptions::new()),
            Arc::new(MemorySessionStore::new()),
        )
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        captions: Arc<dyn CaptionProvider>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        std::fs::create_dir_all(settings.temp_dir())?;

        let gateway = Arc::new(IndexGateway::new(
            embedder,
            store,
            settings.vector_store.mode,
            settings.vector_store.collection.clone(),
        ));
        let normalizer = Normalizer::new(captions, settings.captions.preferred_language.clone());

        Ok(Self {
            settings,
            normalizer,
            gateway,
            sessions,
        })
    }

    /// Get a reference to the index gateway.
    pub fn gateway(&self) -> Arc<IndexGateway> {
        self.gateway.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Ingest a batch of inputs: normalize, chunk, embed, index, and open
    /// a session bound to the target collection.
    #[instrument(skip(self, input))]
    pub async fn ingest(&self, input: IngestInput) -> Result<IngestOutcome> {
        let extractions = self.normalizer.normalize(&input).await?;
        let sources: Vec<SourceStatus> = extractions.iter().map(SourceStatus::from).collect();

        let documents: Vec<SourceDocument> = extractions
            .into_iter()
            .filter(Extraction::has_content)
            .filter_map(|extraction| match extraction {
                Extraction::Document(doc) => Some(doc),
                Extraction::Unavailable { .. } => None,
            })
            .collect();

        if documents.is_empty() {
            let notes = sources.iter().filter_map(|s| s.note.clone()).collect();
            return Err(SvarError::NoExtractableContent { notes });
        }

        let chunk_config = ChunkingConfig {
            chunk_size: self.settings.chunking.chunk_size,
            chunk_overlap: self.settings.chunking.chunk_overlap,
        };
        let chunks = chunk_documents(&documents, &chunk_config);
        info!(
            "Normalized {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );

        let handle = self.gateway.handle_for_ingest().await;
        let added = self.gateway.upsert(&handle, &chunks).await?;
        let session_id = self.sessions.create(handle).await?;

        Ok(IngestOutcome {
            session_id,
            chunks: chunks.len(),
            added,
            sources,
        })
    }

    /// Answer a question against a previously opened session.
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub async fn ask(&self, session_id: &str, query: &str) -> Result<AnswerResult> {
        let handle = self
            .sessions
            .lookup(session_id)
            .await?
            .ok_or_else(|| SvarError::InvalidSession(session_id.to_string()))?;

        let engine = RagEngine::new(self.gateway.clone(), self.settings.rag.clone());
        engine.answer(&handle, query).await
    }
}

/// Result of ingesting one batch.
#[derive(Debug)]
pub struct IngestOutcome {
    /// Session id bound to the indexed corpus.
    pub session_id: String,
    /// Number of chunks produced.
    pub chunks: usize,
    /// Number of chunks written to the index.
    pub added: usize,
    /// Per-input outcome, in input order.
    pub sources: Vec<SourceStatus>,
}

/// Outcome of normalizing one input.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    /// Source label ("inline", a filename, or a URL).
    pub source: String,
    /// Diagnostic note when extraction soft-failed.
    pub note: Option<String>,
    /// Whether the input yielded usable text.
    pub has_content: bool,
}

impl From<&Extraction> for SourceStatus {
    fn from(extraction: &Extraction) -> Self {
        Self {
            source: extraction.source().to_string(),
            note: extraction.note().map(String::from),
            has_content: extraction.has_content(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic embedder that counts how often it is called.
    struct CountingEmbedder {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut vector = vec![0.0f32; 8];
            for (i, byte) in text.bytes().enumerate() {
                vector[i % 8] += byte as f32;
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
            8
        }
    }

    /// Caption stub that always fails, like a video without captions.
    struct NoCaptions;

    #[async_trait]
    impl CaptionProvider for NoCaptions {
        async fn fetch(&self, _url: &str, _language: Option<&str>) -> Result<String> {
            Err(SvarError::Captions("no transcript published".to_string()))
        }
    }

    fn test_settings() -> Settings {
        let mut settings = Settings::default();
        settings.general.temp_dir = std::env::temp_dir()
            .join("svar-test")
            .to_string_lossy()
            .to_string();
        settings
    }

    fn orchestrator() -> (Orchestrator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let orchestrator = Orchestrator::with_components(
            test_settings(),
            Arc::new(CountingEmbedder {
                calls: calls.clone(),
            }),
            Arc::new(MemoryVectorStore::new()),
            Arc::new(NoCaptions),
            Arc::new(MemorySessionStore::new()),
        )
        .unwrap();
        (orchestrator, calls)
    }

    #[tokio::test]
    async fn test_ingest_inline_text() {
        let (orchestrator, _) = orchestrator();

        let outcome = orchestrator
            .ingest(IngestInput {
                text: Some("The sky is blue.".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(!outcome.session_id.is_empty());
        assert!(outcome.chunks >= 1);
        assert_eq!(outcome.added, outcome.chunks);
        assert_eq!(outcome.sources.len(), 1);
        assert_eq!(outcome.sources[0].source, "inline");
        assert_eq!(outcome.sources[0].note, None);
        assert!(outcome.sources[0].has_content);
    }

    #[tokio::test]
    async fn test_ingest_nothing_fails_with_no_extractable_content() {
        let (orchestrator, _) = orchestrator();

        let result = orchestrator.ingest(IngestInput::default()).await;
        match result {
            Err(SvarError::NoExtractableContent { notes }) => assert!(notes.is_empty()),
            other => panic!("expected NoExtractableContent, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_ingest_captionless_video_surfaces_notes() {
        let (orchestrator, _) = orchestrator();

        let result = orchestrator
            .ingest(IngestInput {
                video_url: Some("https://youtu.be/dQw4w9WgXcQ".to_string()),
                ..Default::default()
            })
            .await;

        match result {
            Err(SvarError::NoExtractableContent { notes }) => {
                assert_eq!(notes.len(), 1);
                assert!(notes[0].contains("captions"));
            }
            other => panic!("expected NoExtractableContent, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_partial_success_keeps_failure_notes() {
        let (orchestrator, _) = orchestrator();

        let outcome = orchestrator
            .ingest(IngestInput {
                text: Some("Some pasted notes.".to_string()),
                video_url: Some("https://youtu.be/dQw4w9WgXcQ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.sources.len(), 2);
        assert!(outcome.sources[0].has_content);
        assert!(!outcome.sources[1].has_content);
        assert!(outcome.sources[1].note.as_deref().unwrap().contains("captions"));
    }

    #[tokio::test]
    async fn test_ask_unknown_session_makes_no_provider_calls() {
        let (orchestrator, calls) = orchestrator();

        let result = orchestrator.ask("not-a-session", "what?").await;
        assert!(matches!(result, Err(SvarError::InvalidSession(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ingested_chunk_is_retrievable_by_its_own_content() {
        let (orchestrator, _) = orchestrator();

        let outcome = orchestrator
            .ingest(IngestInput {
                text: Some("The sky is blue.".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(outcome.added, 1);

        let gateway = orchestrator.gateway();
        let handle = gateway.connect(&orchestrator.settings().vector_store.collection);
        let results = gateway.search(&handle, "The sky is blue.", 5).await.unwrap();

        assert!(!results.is_empty());
        assert_eq!(results[0].content, "The sky is blue.");
    }
}
