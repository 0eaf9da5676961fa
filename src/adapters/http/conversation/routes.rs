//! Axum routes for chat endpoints.
//!
//! Defines the routing table for all conversation-related HTTP endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{
    create_conversation, delete_conversation, get_conversation, list_conversations, send_message,
    suggestions, ChatAppState,
};

/// Creates routes for chat endpoints.
///
/// Endpoints:
/// - POST /conversations - Create a conversation (optionally with a first message)
/// - GET /conversations - List visible conversations
/// - GET /conversations/suggestions - Prompt suggestions per type
/// - GET /conversations/:id - Conversation with messages
/// - DELETE /conversations/:id - Delete a conversation
/// - POST /conversations/:id/messages - Post a message, receive the reply
pub fn chat_routes() -> Router<ChatAppState> {
    Router::new()
        .route("/conversations", get(list_conversations).post(create_conversation))
        .route("/conversations/suggestions", get(suggestions))
        .route(
            "/conversations/:conversation_id",
            get(get_conversation).delete(delete_conversation),
        )
        .route("/conversations/:conversation_id/messages", axum::routing::post(send_message))
}

/// Combined router with all chat routes under /api.
pub fn chat_router() -> Router<ChatAppState> {
    Router::new().nest("/api", chat_routes())
}
