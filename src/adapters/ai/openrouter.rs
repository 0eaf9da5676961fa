//! OpenRouter provider - the aggregator backend.
//!
//! OpenRouter fronts many upstream models behind an OpenAI-compatible
//! surface; model names are namespaced ("anthropic/claude-3-5-sonnet").
//! Used as the secondary backend in the fallback chain.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{AIError, AIProvider, ChatRole, CompletionRequest, CompletionResponse, TokenUsage};

/// Configuration for the OpenRouter backend.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    api_key: Secret<String>,
    /// Default model, namespaced by upstream provider.
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Default temperature.
    pub temperature: f32,
    /// Default token ceiling.
    pub max_tokens: u32,
    /// Default nucleus sampling parameter.
    pub top_p: f32,
    /// Referer reported to the aggregator for request attribution.
    pub referer: Option<String>,
}

impl OpenRouterConfig {
    /// Creates a configuration with the given API key and standard defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "anthropic/claude-3-5-haiku".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.7,
            max_tokens: 1024,
            top_p: 1.0,
            referer: None,
        }
    }

    /// Sets the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the attribution referer.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenRouter aggregator provider.
pub struct OpenRouterProvider {
    config: OpenRouterConfig,
    client: Client,
}

impl OpenRouterProvider {
    /// Creates a provider from configuration.
    pub fn new(config: OpenRouterConfig) -> Result<Self, AIError> {
        if config.api_key().is_empty() {
            return Err(AIError::AuthenticationFailed);
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    async fn send(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let mut messages = Vec::new();
        if let Some(ref prompt) = request.system_prompt {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: prompt.clone(),
            });
        }
        for msg in &request.messages {
            messages.push(WireMessage {
                role: match msg.role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content.clone(),
            });
        }

        let wire = WireRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature.unwrap_or(self.config.temperature),
            top_p: request.top_p.unwrap_or(self.config.top_p),
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json");
        if let Some(ref referer) = self.config.referer {
            builder = builder.header("HTTP-Referer", referer);
        }

        builder.json(&wire).send().await.map_err(|e| {
            if e.is_timeout() {
                AIError::Timeout {
                    timeout_secs: self.config.timeout.as_secs() as u32,
                }
            } else {
                AIError::network(e.to_string())
            }
        })
    }
}

#[async_trait]
impl AIProvider for OpenRouterProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.send(&request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => AIError::AuthenticationFailed,
                402 => AIError::unavailable(format!("credits exhausted: {body}")),
                429 => AIError::RateLimited { retry_after_secs: 30 },
                400 => AIError::InvalidRequest(body),
                500..=599 => AIError::unavailable(format!("server error {status}: {body}")),
                _ => AIError::network(format!("unexpected status {status}: {body}")),
            });
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("failed to decode response: {e}")))?;

        let choice = wire
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("no choices in response"))?;

        let usage = wire
            .usage
            .map(|u| {
                TokenUsage::new(
                    u.prompt_tokens,
                    u.completion_tokens,
                    cost_cents(&wire.model, u.prompt_tokens + u.completion_tokens),
                )
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content,
            usage,
            model: wire.model,
        })
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}

/// Aggregator rate table, cents per million tokens, default for the rest.
fn cost_cents(model: &str, total_tokens: u32) -> u32 {
    let cents_per_million: u64 = match model {
        m if m.contains("claude-3-5-haiku") => 150,
        m if m.contains("claude-3-5-sonnet") => 900,
        m if m.contains("llama-3") => 30,
        m if m.contains("gpt-4o-mini") => 60,
        _ => 500,
    };
    ((total_tokens as u64 * cents_per_million) / 1_000_000) as u32
}

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    model: String,
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
