//! HTTP adapters - axum routes, handlers, and middleware for the chat API.

pub mod conversation;
pub mod middleware;

pub use conversation::{chat_router, ChatAppState};
