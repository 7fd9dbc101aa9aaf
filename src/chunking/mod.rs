//! Content chunking: splitting documents into retrievable segments.

mod splitter;

pub use splitter::RecursiveSplitter;

use crate::source::{SourceDocument, SourceMetadata};
use serde::{Deserialize, Serialize};

/// A bounded-length slice of a document, the unit of embedding and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of this chunk.
    pub content: String,
    /// Metadata copied from the source document.
    pub metadata: SourceMetadata,
}

/// Configuration for chunking.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters of overlap carried between adjacent chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 160,
        }
    }
}

/// Split each document into chunks. Empty documents yield no chunks.
pub fn chunk_documents(documents: &[SourceDocument], config: &ChunkingConfig) -> Vec<Chunk> {
    let splitter = RecursiveSplitter::new(config.chunk_size, config.chunk_overlap);

    let mut chunks = Vec::new();
    for doc in documents {
        for piece in splitter.split(&doc.content) {
            chunks.push(Chunk {
                content: piece,
                metadata: doc.metadata.clone(),
            });
        }
    }
    chunks
}
