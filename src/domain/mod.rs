//! Domain layer - pure types and rules with no infrastructure dependencies.

pub mod client;
pub mod conversation;
pub mod foundation;
pub mod intent;
