//! Message - one turn in a conversation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{ConversationId, MessageId, Timestamp};

/// Role of a message sender.
///
/// Only two roles exist at the conversation level; system prompts are
/// assembled per request and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// End-user input.
    User,
    /// Assistant reply.
    Assistant,
}

impl MessageRole {
    /// Parses a role from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }

    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn in a conversation. Created per exchange, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id.
    pub id: MessageId,
    /// Owning conversation.
    pub conversation_id: ConversationId,
    /// Who sent this message.
    pub role: MessageRole,
    /// Text content.
    pub content: String,
    /// Free-form key/value metadata: token usage, cost, fallback flags.
    pub metadata: Map<String, Value>,
    /// Creation time; messages are ordered by this within a conversation.
    pub created_at: Timestamp,
}

impl Message {
    /// Creates a new message in the given conversation.
    pub fn new(conversation_id: ConversationId, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role,
            content: content.into(),
            metadata: Map::new(),
            created_at: Timestamp::now(),
        }
    }

    /// Attaches a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
