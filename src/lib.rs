//! TaskPilot Assistant - Conversational Core
//!
//! This crate implements the chat pipeline of the TaskPilot business
//! management platform: intent detection over free text, multi-turn slot
//! filling, client operations driven by natural language, and two-tier
//! LLM provider fallback.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
