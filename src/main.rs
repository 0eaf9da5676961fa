//! TaskPilot assistant server binary.
//!
//! Loads configuration from the environment, wires the chat pipeline over
//! its adapters, and serves the HTTP API.

use std::sync::Arc;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use taskpilot_assistant::adapters::ai::{
    OpenAiConfig, OpenAiProvider, OpenRouterConfig, OpenRouterProvider, ProviderGateway,
};
use taskpilot_assistant::adapters::context::{InMemoryContextStore, RedisContextStore};
use taskpilot_assistant::adapters::http::{chat_router, ChatAppState};
use taskpilot_assistant::adapters::storage::{InMemoryClientStore, InMemoryConversationRepository};
use taskpilot_assistant::application::chat::{
    AiIntentClassifier, ChatOrchestrator, ClientActionExecutor, IntentDetector,
};
use taskpilot_assistant::config::AppConfig;
use taskpilot_assistant::ports::{AIProvider, ContextStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let gateway = Arc::new(ProviderGateway::new(build_backends(&config)?));

    let context: Arc<dyn ContextStore> = if config.cache.has_redis() {
        let url = config.cache.redis_url.as_deref().unwrap_or_default();
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::info!("slot-filling state backed by redis");
        Arc::new(RedisContextStore::new(conn))
    } else {
        tracing::info!("slot-filling state backed by process memory");
        Arc::new(InMemoryContextStore::new())
    };

    let orchestrator = ChatOrchestrator::new(
        Arc::new(InMemoryConversationRepository::new()),
        context,
        IntentDetector::new(Arc::new(AiIntentClassifier::new(gateway.clone()))),
        ClientActionExecutor::new(Arc::new(InMemoryClientStore::new())),
        gateway,
    );

    let app = chat_router()
        .with_state(ChatAppState::new(Arc::new(orchestrator)))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "taskpilot assistant listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the fallback chain in fixed order: OpenAI, then OpenRouter.
fn build_backends(config: &AppConfig) -> Result<Vec<Arc<dyn AIProvider>>, Box<dyn std::error::Error>> {
    let mut backends: Vec<Arc<dyn AIProvider>> = Vec::new();

    if let Some(key) = config.ai.openai_api_key.as_deref().filter(|k| !k.is_empty()) {
        let provider = OpenAiProvider::new(
            OpenAiConfig::new(key)
                .with_model(&config.ai.openai_model)
                .with_timeout(config.ai.timeout())
                .with_temperature(config.ai.temperature)
                .with_max_tokens(config.ai.max_tokens),
        )?;
        backends.push(Arc::new(provider));
    }

    if let Some(key) = config.ai.openrouter_api_key.as_deref().filter(|k| !k.is_empty()) {
        let mut or_config = OpenRouterConfig::new(key)
            .with_model(&config.ai.openrouter_model)
            .with_timeout(config.ai.timeout());
        if let Some(referer) = &config.ai.openrouter_referer {
            or_config = or_config.with_referer(referer);
        }
        backends.push(Arc::new(OpenRouterProvider::new(or_config)?));
    }

    Ok(backends)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
