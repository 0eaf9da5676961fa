//! Conversation aggregate - an ongoing exchange between one user and the
//! assistant, made of immutable ordered messages.

mod conversation;
mod message;

pub use conversation::{
    heuristic_title, Conversation, ConversationType, TitleRule, AI_TITLE_THRESHOLD,
    TRANSIENT_MESSAGE_LIMIT,
};
pub use message::{Message, MessageRole};
