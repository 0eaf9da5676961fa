//! Context store adapters: in-memory for tests and single-server
//! deployments, Redis for multi-server production.

mod in_memory;
mod redis;

pub use in_memory::InMemoryContextStore;
pub use redis::RedisContextStore;
