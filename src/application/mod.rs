//! Application layer - orchestration of the chat pipeline over the ports.

pub mod chat;
