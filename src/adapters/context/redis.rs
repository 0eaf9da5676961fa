//! Redis-backed context store for multi-server deployments.
//!
//! State is serialized as JSON under a per-conversation key with `SET EX`
//! so Redis evicts on its own schedule; `get` still re-checks the stored
//! timestamp, guarding against clock or eviction skew between servers.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::ConversationId;
use crate::domain::intent::PendingSlotState;
use crate::ports::{ContextStore, ContextStoreError, CONTEXT_TTL_SECS};

/// Redis context store.
#[derive(Clone)]
pub struct RedisContextStore {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisContextStore {
    /// Creates a store over an established connection.
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            ttl_secs: CONTEXT_TTL_SECS,
        }
    }

    fn key(conversation_id: ConversationId) -> String {
        format!("chat:context:{conversation_id}")
    }
}

#[async_trait]
impl ContextStore for RedisContextStore {
    async fn get(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<PendingSlotState>, ContextStoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(Self::key(conversation_id))
            .await
            .map_err(|e| ContextStoreError::Unavailable(e.to_string()))?;

        let Some(raw) = raw else { return Ok(None) };

        let state: PendingSlotState = serde_json::from_str(&raw)
            .map_err(|e| ContextStoreError::Corrupt(e.to_string()))?;

        if state.is_expired(self.ttl_secs) {
            let _: Result<(), _> = conn.del(Self::key(conversation_id)).await;
            return Ok(None);
        }
        Ok(Some(state))
    }

    async fn put(&self, state: PendingSlotState) -> Result<(), ContextStoreError> {
        let raw = serde_json::to_string(&state)
            .map_err(|e| ContextStoreError::Corrupt(e.to_string()))?;

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(state.conversation_id), raw, self.ttl_secs)
            .await
            .map_err(|e| ContextStoreError::Unavailable(e.to_string()))
    }

    async fn clear(&self, conversation_id: ConversationId) -> Result<(), ContextStoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(conversation_id))
            .await
            .map_err(|e| ContextStoreError::Unavailable(e.to_string()))
    }
}
