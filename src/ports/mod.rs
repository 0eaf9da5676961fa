//! Ports - async trait seams between the chat core and its collaborators.

mod ai_provider;
mod client_store;
mod context_store;
mod conversation_repository;

pub use ai_provider::{
    AIError, AIProvider, ChatMessage, ChatRole, CompletionRequest, CompletionResponse, TokenUsage,
};
pub use client_store::{ClientFilters, ClientStore, ClientStoreError, ClientUpdate};
pub use context_store::{ContextStore, ContextStoreError, CONTEXT_TTL_SECS};
pub use conversation_repository::{ConversationRepository, RepositoryError};
