//! HTTP adapter for conversation and chat endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::ChatAppState;
pub use routes::{chat_router, chat_routes};
