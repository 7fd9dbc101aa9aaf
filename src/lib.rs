//! Svar - Retrieval-Augmented Question Answering
//!
//! A minimal RAG service that ingests heterogeneous content and answers
//! natural-language questions grounded in it.
//!
//! The name "Svar" comes from the Norwegian/Scandinavian word for "answer."
//!
//! # Overview
//!
//! Svar allows you to:
//! - Ingest pasted text, PDF uploads, and YouTube caption transcripts
//! - Index the content as overlapping chunks in a vector database
//! - Ask questions bound to an ingestion session and get cited answers
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `source` - Source normalization (inline text, PDF, YouTube captions)
//! - `chunking` - Recursive text splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `index` - Index gateway over embedder and vector store
//! - `session` - Session registry
//! - `rag` - RAG engine for question answering
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use svar::config::Settings;
//! use svar::orchestrator::Orchestrator;
//! use svar::source::IngestInput;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let outcome = orchestrator
//!         .ingest(IngestInput {
//!             text: Some("The sky is blue.".to_string()),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     let answer = orchestrator
//!         .ask(&outcome.session_id, "What color is the sky?")
//!         .await?;
//!     println!("{}", answer.text);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod session;
pub mod source;
pub mod vector_store;

pub use error::{Result, SvarError};
