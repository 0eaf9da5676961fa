//! Storage adapters - in-memory implementations of the persistence ports.
//!
//! The platform's real persistence layer lives in its CRUD modules; the
//! chat core only depends on the ports, and these adapters back them for
//! tests and standalone deployments.

mod in_memory_clients;
mod in_memory_conversations;

pub use in_memory_clients::InMemoryClientStore;
pub use in_memory_conversations::InMemoryConversationRepository;
