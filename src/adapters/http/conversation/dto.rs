//! HTTP DTOs for chat endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::conversation::{Conversation, Message};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body for creating a conversation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    /// Conversation category; defaults to `general`.
    #[serde(default)]
    pub conversation_type: Option<String>,
    /// Explicit title; usually omitted and assigned later.
    #[serde(default)]
    pub title: Option<String>,
    /// Optional first message, processed immediately after creation.
    #[serde(default)]
    pub message: Option<String>,
}

/// Body for posting a message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Message text.
    pub content: String,
    /// `user` (default) or `assistant`; assistant messages are persisted
    /// without generating a reply.
    #[serde(default)]
    pub role: Option<String>,
    /// Skip the AI classification tier for this message.
    #[serde(default)]
    pub rules_only: bool,
}

/// Query parameters for listing conversations.
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    /// Filter by conversation type.
    #[serde(rename = "type")]
    pub conversation_type: Option<String>,
    /// Maximum conversations to return.
    pub limit: Option<usize>,
}

impl ListParams {
    /// Default listing limit.
    pub const DEFAULT_LIMIT: usize = 20;
    /// Maximum allowed limit.
    pub const MAX_LIMIT: usize = 100;

    /// Effective limit, clamped to the allowed range.
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

/// Query parameters for prompt suggestions.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionsParams {
    /// Conversation type to suggest prompts for; defaults to `general`.
    #[serde(rename = "type")]
    pub conversation_type: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// View of a conversation for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub id: String,
    pub conversation_type: String,
    pub title: Option<String>,
    pub last_activity_at: String,
    pub created_at: String,
}

impl ConversationView {
    pub fn from_domain(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id.to_string(),
            conversation_type: conversation.conversation_type.as_str().to_string(),
            title: conversation.title.clone(),
            last_activity_at: conversation.last_activity_at.to_rfc3339(),
            created_at: conversation.created_at.to_rfc3339(),
        }
    }
}

/// View of a message for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub conversation_id: String,
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    pub created_at: String,
}

impl MessageView {
    pub fn from_domain(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            conversation_id: message.conversation_id.to_string(),
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
            metadata: message.metadata.clone(),
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// One processed exchange: the posted message and the reply, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeView {
    pub conversation: ConversationView,
    pub user_message: MessageView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_message: Option<MessageView>,
}

/// Conversation with its full message history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetailView {
    #[serde(flatten)]
    pub conversation: ConversationView,
    pub messages: Vec<MessageView>,
}

/// Prompt suggestions for one conversation type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsView {
    pub conversation_type: String,
    pub suggestions: Vec<String>,
}

/// Error payload shared by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "BAD_REQUEST",
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self {
            error: format!("{resource} not found"),
            code: "NOT_FOUND",
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "INTERNAL_ERROR",
        }
    }
}
