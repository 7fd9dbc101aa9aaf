//! Error types for Svar.

use thiserror::Error;

/// Library-level error type for Svar operations.
///
/// Per-source extraction failures (unparseable PDF, missing captions) are
/// deliberately NOT errors: they surface as diagnostic notes on the
/// normalizer output so a batch with at least one good source still succeeds.
#[derive(Error, Debug)]
pub enum SvarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error(
        "No extractable content in any input. Tips: check that the video has captions, \
         the PDF contains selectable text, or the text field is non-empty."
    )]
    NoExtractableContent { notes: Vec<String> },

    #[error("Provider misconfigured: {0}")]
    MisconfiguredProvider(String),

    #[error("Unknown session: {0}")]
    InvalidSession(String),

    #[error("Caption retrieval failed: {0}")]
    Captions(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("RAG error: {0}")]
    Rag(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Svar operations.
pub type Result<T> = std::result::Result<T, SvarError>;
