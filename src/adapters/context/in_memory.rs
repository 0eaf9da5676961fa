//! In-memory context store for testing and single-server deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::ConversationId;
use crate::domain::intent::PendingSlotState;
use crate::ports::{ContextStore, ContextStoreError, CONTEXT_TTL_SECS};

/// HashMap-backed context store.
///
/// Expired entries are dropped lazily on read; `get` checks the stored
/// timestamp itself, so eviction timing never changes observable behavior.
#[derive(Debug, Default)]
pub struct InMemoryContextStore {
    entries: Arc<RwLock<HashMap<ConversationId, PendingSlotState>>>,
    ttl_secs: u64,
}

impl InMemoryContextStore {
    /// Creates a store with the standard TTL.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl_secs: CONTEXT_TTL_SECS,
        }
    }

    /// Overrides the TTL, for tests exercising expiry.
    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    async fn get(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<PendingSlotState>, ContextStoreError> {
        let expired = {
            let entries = self.entries.read().await;
            match entries.get(&conversation_id) {
                None => return Ok(None),
                Some(state) if state.is_expired(self.ttl_secs) => true,
                Some(state) => return Ok(Some(state.clone())),
            }
        };

        if expired {
            self.entries.write().await.remove(&conversation_id);
        }
        Ok(None)
    }

    async fn put(&self, state: PendingSlotState) -> Result<(), ContextStoreError> {
        self.entries.write().await.insert(state.conversation_id, state);
        Ok(())
    }

    async fn clear(&self, conversation_id: ConversationId) -> Result<(), ContextStoreError> {
        self.entries.write().await.remove(&conversation_id);
        Ok(())
    }
}
