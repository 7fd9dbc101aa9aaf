//! In-memory session store.

use super::{new_session_id, SessionStore};
use crate::error::Result;
use crate::index::IndexHandle;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Process-local session store. A restart invalidates every session.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, IndexHandle>>,
}

impl MemorySessionStore {
    /// Create a new empty session store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, handle: IndexHandle) -> Result<String> {
        let id = new_session_id();
        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(id.clone(), handle);
        Ok(id)
    }

    async fn lookup(&self, session_id: &str) -> Result<Option<IndexHandle>> {
        let sessions = self.sessions.read().unwrap();
        Ok(sessions.get(session_id).cloned())
    }
}
