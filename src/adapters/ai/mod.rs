//! AI provider adapters: the OpenAI-style backend, the aggregator backend,
//! the ordered fallback gateway, and a scripted mock for tests.

mod gateway;
mod mock;
mod openai;
mod openrouter;

pub use gateway::{GatewayCompletion, ProviderGateway};
pub use mock::MockProvider;
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use openrouter::{OpenRouterConfig, OpenRouterProvider};
