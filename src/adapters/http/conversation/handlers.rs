//! HTTP handlers for chat endpoints.
//!
//! These handlers connect axum routes to the chat orchestrator.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::chat::{suggestions_for, ChatError, ChatOptions, ChatOrchestrator};
use crate::domain::conversation::{ConversationType, MessageRole};
use crate::domain::foundation::ConversationId;

use super::dto::{
    ConversationDetailView, ConversationView, CreateConversationRequest, ErrorResponse,
    ExchangeView, ListParams, MessageView, SendMessageRequest, SuggestionsParams, SuggestionsView,
};
use crate::adapters::http::middleware::RequireUser;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for chat handlers.
#[derive(Clone)]
pub struct ChatAppState {
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl ChatAppState {
    pub fn new(orchestrator: Arc<ChatOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// POST /api/conversations
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/conversations - Create a conversation.
///
/// Optionally carries a first message, which runs through the chat pipeline
/// immediately; the response then includes both persisted messages.
///
/// # Errors
/// - 400 Bad Request: Unknown conversation type
/// - 401 Unauthorized: Missing user identity
pub async fn create_conversation(
    State(state): State<ChatAppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<CreateConversationRequest>,
) -> Result<Response, ChatApiError> {
    let conversation_type = parse_type(body.conversation_type.as_deref())?;

    let conversation = state
        .orchestrator
        .create_conversation(&user, conversation_type, body.title)
        .await?;

    let Some(message) = body.message.filter(|m| !m.trim().is_empty()) else {
        let view = ConversationView::from_domain(&conversation);
        return Ok((StatusCode::CREATED, Json(view)).into_response());
    };

    let exchange = state
        .orchestrator
        .send_message(
            &user,
            conversation.id,
            &message,
            MessageRole::User,
            ChatOptions::default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(exchange_view(exchange))).into_response())
}

// ════════════════════════════════════════════════════════════════════════════════
// POST /api/conversations/:id/messages
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/conversations/:id/messages - Post a message.
///
/// User-role messages run the full chat pipeline and return the assistant
/// reply; assistant-role messages are persisted as-is.
///
/// # Errors
/// - 400 Bad Request: Invalid id, empty content, or unknown role
/// - 401 Unauthorized: Missing user identity
/// - 404 Not Found: Conversation does not exist for this user
pub async fn send_message(
    State(state): State<ChatAppState>,
    RequireUser(user): RequireUser,
    Path(conversation_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ChatApiError> {
    let conversation_id = parse_id(&conversation_id)?;

    if body.content.trim().is_empty() {
        return Err(ChatApiError::BadRequest("Message content must not be empty".to_string()));
    }

    let role = match body.role.as_deref() {
        None => MessageRole::User,
        Some(raw) => MessageRole::parse(raw)
            .ok_or_else(|| ChatApiError::BadRequest(format!("Unknown message role: {raw}")))?,
    };

    let exchange = state
        .orchestrator
        .send_message(
            &user,
            conversation_id,
            &body.content,
            role,
            ChatOptions {
                rules_only: body.rules_only,
            },
        )
        .await?;

    Ok((StatusCode::OK, Json(exchange_view(exchange))))
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /api/conversations/:id
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/conversations/:id - Get a conversation with its messages.
///
/// # Errors
/// - 400 Bad Request: Invalid id format
/// - 401 Unauthorized: Missing user identity
/// - 404 Not Found: Conversation does not exist for this user
pub async fn get_conversation(
    State(state): State<ChatAppState>,
    RequireUser(user): RequireUser,
    Path(conversation_id): Path<String>,
) -> Result<impl IntoResponse, ChatApiError> {
    let conversation_id = parse_id(&conversation_id)?;

    let (conversation, messages) = state
        .orchestrator
        .get_conversation(&user, conversation_id)
        .await?;

    let view = ConversationDetailView {
        conversation: ConversationView::from_domain(&conversation),
        messages: messages.iter().map(MessageView::from_domain).collect(),
    };
    Ok((StatusCode::OK, Json(view)))
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /api/conversations
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/conversations - List visible conversations, most recent first.
///
/// Transient conversations (too few messages) are excluded.
///
/// # Query Parameters
/// - `type`: Filter by conversation type
/// - `limit`: Maximum conversations to return (default: 20, max: 100)
pub async fn list_conversations(
    State(state): State<ChatAppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ChatApiError> {
    let filter = match params.conversation_type.as_deref() {
        Some(raw) => Some(parse_type(Some(raw))?),
        None => None,
    };

    let conversations = state
        .orchestrator
        .list_conversations(&user, filter, params.effective_limit())
        .await?;

    let views: Vec<ConversationView> =
        conversations.iter().map(ConversationView::from_domain).collect();
    Ok((StatusCode::OK, Json(views)))
}

// ════════════════════════════════════════════════════════════════════════════════
// DELETE /api/conversations/:id
// ════════════════════════════════════════════════════════════════════════════════

/// DELETE /api/conversations/:id - Delete a conversation and its messages.
///
/// # Errors
/// - 400 Bad Request: Invalid id format
/// - 401 Unauthorized: Missing user identity
/// - 404 Not Found: Conversation does not exist for this user
pub async fn delete_conversation(
    State(state): State<ChatAppState>,
    RequireUser(user): RequireUser,
    Path(conversation_id): Path<String>,
) -> Result<impl IntoResponse, ChatApiError> {
    let conversation_id = parse_id(&conversation_id)?;
    state
        .orchestrator
        .delete_conversation(&user, conversation_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /api/conversations/suggestions
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/conversations/suggestions - Prompt suggestions per type.
pub async fn suggestions(
    RequireUser(_user): RequireUser,
    Query(params): Query<SuggestionsParams>,
) -> Result<impl IntoResponse, ChatApiError> {
    let conversation_type = parse_type(params.conversation_type.as_deref())?;

    let view = SuggestionsView {
        conversation_type: conversation_type.as_str().to_string(),
        suggestions: suggestions_for(conversation_type)
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };
    Ok((StatusCode::OK, Json(view)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Helper Functions
// ════════════════════════════════════════════════════════════════════════════════

fn parse_id(raw: &str) -> Result<ConversationId, ChatApiError> {
    raw.parse()
        .map_err(|_| ChatApiError::BadRequest("Invalid conversation ID format".to_string()))
}

fn parse_type(raw: Option<&str>) -> Result<ConversationType, ChatApiError> {
    match raw {
        None => Ok(ConversationType::General),
        Some(raw) => ConversationType::parse(raw)
            .ok_or_else(|| ChatApiError::BadRequest(format!("Unknown conversation type: {raw}"))),
    }
}

fn exchange_view(exchange: crate::application::chat::ChatExchange) -> ExchangeView {
    ExchangeView {
        conversation: ConversationView::from_domain(&exchange.conversation),
        user_message: MessageView::from_domain(&exchange.user_message),
        assistant_message: exchange
            .assistant_message
            .as_ref()
            .map(MessageView::from_domain),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts pipeline errors to HTTP responses.
#[derive(Debug)]
pub enum ChatApiError {
    BadRequest(String),
    NotFound(&'static str),
    Internal(String),
}

impl From<ChatError> for ChatApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::ConversationNotFound => ChatApiError::NotFound("Conversation"),
            ChatError::Repository(err) => ChatApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ChatApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            ChatApiError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, ErrorResponse::not_found(resource))
            }
            ChatApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal("An internal error occurred"),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}
