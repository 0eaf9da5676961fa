//! Adapters - infrastructure implementations of the ports.

pub mod ai;
pub mod context;
pub mod http;
pub mod storage;
