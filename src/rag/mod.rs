//! RAG (Retrieval-Augmented Generation): answering questions with cited sources.

pub mod context;
mod engine;

pub use engine::RagEngine;

use serde::{Deserialize, Serialize};

/// A cited source accompanying an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source label of the retrieved chunk.
    pub source: String,
    /// Leading excerpt of the chunk content.
    pub snippet: String,
}

/// A generated answer with its sources, in retrieval order.
#[derive(Debug, Clone)]
pub struct AnswerResult {
    /// The generated answer text.
    pub text: String,
    /// One entry per retrieved chunk, duplicates included.
    pub sources: Vec<SourceRef>,
}
