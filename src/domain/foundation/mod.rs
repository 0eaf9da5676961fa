//! Shared value objects used across the domain.

mod ids;
mod timestamp;

pub use ids::{ConversationId, MessageId, UserId};
pub use timestamp::Timestamp;
