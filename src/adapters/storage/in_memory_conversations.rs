//! In-memory conversation repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{Conversation, ConversationType, Message, TRANSIENT_MESSAGE_LIMIT};
use crate::domain::foundation::{ConversationId, Timestamp, UserId};
use crate::ports::{ConversationRepository, RepositoryError};

#[derive(Debug, Default)]
struct Inner {
    conversations: HashMap<ConversationId, Conversation>,
    messages: HashMap<ConversationId, Vec<Message>>,
}

/// HashMap-backed conversation repository.
#[derive(Debug, Default)]
pub struct InMemoryConversationRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryConversationRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn insert(&self, conversation: Conversation) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.messages.entry(conversation.id).or_default();
        inner.conversations.insert(conversation.id, conversation);
        Ok(())
    }

    async fn find(
        &self,
        id: ConversationId,
        user: &UserId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .conversations
            .get(&id)
            .filter(|c| &c.user_id == user)
            .cloned())
    }

    async fn list_visible(
        &self,
        user: &UserId,
        conversation_type: Option<ConversationType>,
        limit: usize,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut visible: Vec<Conversation> = inner
            .conversations
            .values()
            .filter(|c| &c.user_id == user)
            .filter(|c| conversation_type.map(|t| c.conversation_type == t).unwrap_or(true))
            .filter(|c| {
                inner
                    .messages
                    .get(&c.id)
                    .map(|m| m.len() as u32 > TRANSIENT_MESSAGE_LIMIT)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        visible.sort_by(|a, b| b.last_activity_at.cmp(&a.last_activity_at));
        visible.truncate(limit);
        Ok(visible)
    }

    async fn delete(&self, id: ConversationId, user: &UserId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        match inner.conversations.get(&id) {
            Some(c) if &c.user_id == user => {
                inner.conversations.remove(&id);
                // Cascade.
                inner.messages.remove(&id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(id)),
        }
    }

    async fn append_message(&self, message: Message) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        let id = message.conversation_id;
        if !inner.conversations.contains_key(&id) {
            return Err(RepositoryError::NotFound(id));
        }
        inner.messages.entry(id).or_default().push(message);
        if let Some(conversation) = inner.conversations.get_mut(&id) {
            conversation.last_activity_at = Timestamp::now();
        }
        Ok(())
    }

    async fn messages(&self, id: ConversationId) -> Result<Vec<Message>, RepositoryError> {
        let inner = self.inner.read().await;
        inner
            .messages
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn message_count(&self, id: ConversationId) -> Result<u32, RepositoryError> {
        let inner = self.inner.read().await;
        inner
            .messages
            .get(&id)
            .map(|m| m.len() as u32)
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn set_title(&self, id: ConversationId, title: &str) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        let conversation = inner
            .conversations
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        conversation.title = Some(title.to_string());
        Ok(())
    }
}
