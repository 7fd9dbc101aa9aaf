//! Session registry binding an ingestion batch to later questions.

mod memory;

pub use memory::MemorySessionStore;

use crate::error::Result;
use crate::index::IndexHandle;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

/// Registry mapping opaque session ids to index handles.
///
/// Sessions are created on successful ingestion and looked up read-only on
/// every question; there is no update, delete, or expiry. The in-memory
/// implementation loses all sessions on process restart.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Record a handle under a fresh session id and return the id.
    async fn create(&self, handle: IndexHandle) -> Result<String>;

    /// Resolve a session id to its handle, if known.
    async fn lookup(&self, session_id: &str) -> Result<Option<IndexHandle>>;
}

/// Generate a fresh opaque session id.
///
/// Combines a millisecond timestamp with a random UUID so collisions are
/// negligible for the life of a process.
pub fn new_session_id() -> String {
    format!(
        "{:x}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}
