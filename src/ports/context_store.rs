//! Conversation Context Store Port - short-TTL slot-filling state.
//!
//! One place owns expiry: implementations must re-check the stored
//! timestamp inside `get` and report anything past the TTL as absent, even
//! if the backing cache has not evicted it yet. Callers never re-derive
//! expiry logic.

use async_trait::async_trait;

use crate::domain::foundation::ConversationId;
use crate::domain::intent::PendingSlotState;

/// How long pending slot-filling state stays valid.
pub const CONTEXT_TTL_SECS: u64 = 300;

/// Keyed store for pending slot-filling state, isolated per conversation.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Returns the state for a conversation, or `None` when absent or
    /// older than [`CONTEXT_TTL_SECS`].
    async fn get(&self, conversation_id: ConversationId)
        -> Result<Option<PendingSlotState>, ContextStoreError>;

    /// Stores state for a conversation, overwriting any existing entry.
    async fn put(&self, state: PendingSlotState) -> Result<(), ContextStoreError>;

    /// Removes state for a conversation. No-op when absent.
    async fn clear(&self, conversation_id: ConversationId) -> Result<(), ContextStoreError>;
}

/// Context store errors.
#[derive(Debug, thiserror::Error)]
pub enum ContextStoreError {
    /// Backing cache failure.
    #[error("context store unavailable: {0}")]
    Unavailable(String),

    /// Stored state could not be decoded.
    #[error("context state corrupt: {0}")]
    Corrupt(String),
}
