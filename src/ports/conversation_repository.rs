//! Conversation Repository Port - persistence seam for conversations and
//! their ordered messages.

use async_trait::async_trait;

use crate::domain::conversation::{Conversation, ConversationType, Message};
use crate::domain::foundation::{ConversationId, UserId};

/// Port over conversation persistence.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Persists a new conversation.
    async fn insert(&self, conversation: Conversation) -> Result<(), RepositoryError>;

    /// Fetches a conversation owned by `user`.
    async fn find(
        &self,
        id: ConversationId,
        user: &UserId,
    ) -> Result<Option<Conversation>, RepositoryError>;

    /// Lists a user's conversations ordered by last activity descending.
    ///
    /// Transient conversations (three messages or fewer) are excluded.
    async fn list_visible(
        &self,
        user: &UserId,
        conversation_type: Option<ConversationType>,
        limit: usize,
    ) -> Result<Vec<Conversation>, RepositoryError>;

    /// Deletes a conversation and all its messages.
    async fn delete(&self, id: ConversationId, user: &UserId) -> Result<(), RepositoryError>;

    /// Appends a message and bumps the conversation's last activity.
    async fn append_message(&self, message: Message) -> Result<(), RepositoryError>;

    /// Returns all messages of a conversation in creation order.
    async fn messages(&self, id: ConversationId) -> Result<Vec<Message>, RepositoryError>;

    /// Returns the message count of a conversation.
    async fn message_count(&self, id: ConversationId) -> Result<u32, RepositoryError>;

    /// Sets the conversation title.
    async fn set_title(&self, id: ConversationId, title: &str) -> Result<(), RepositoryError>;
}

/// Repository errors.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No such conversation for this user.
    #[error("conversation {0} not found")]
    NotFound(ConversationId),

    /// Storage infrastructure failure.
    #[error("conversation store unavailable: {0}")]
    Unavailable(String),
}
