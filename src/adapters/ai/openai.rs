//! OpenAI-style provider - chat completions over the standard
//! `/chat/completions` endpoint.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiConfig::new(api_key)
//!     .with_model("gpt-4o-mini")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let provider = OpenAiProvider::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{AIError, AIProvider, ChatRole, CompletionRequest, CompletionResponse, TokenUsage};

/// Configuration for the OpenAI-style backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Default model.
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout; surfaced as a distinct error when exceeded.
    pub timeout: Duration,
    /// Default temperature applied when the request leaves it unset.
    pub temperature: f32,
    /// Default token ceiling applied when the request leaves it unset.
    pub max_tokens: u32,
    /// Default nucleus sampling parameter.
    pub top_p: f32,
    /// Frequency penalty passed through verbatim.
    pub frequency_penalty: f32,
    /// Presence penalty passed through verbatim.
    pub presence_penalty: f32,
}

impl OpenAiConfig {
    /// Creates a configuration with the given API key and standard defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.7,
            max_tokens: 1024,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
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

    /// Sets the default temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the default token ceiling.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-style API provider.
#[derive(Debug)]
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    /// Creates a provider from configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self, AIError> {
        if config.api_key().is_empty() {
            return Err(AIError::AuthenticationFailed);
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_wire_request(&self, request: &CompletionRequest) -> WireRequest {
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

        WireRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature.unwrap_or(self.config.temperature),
            top_p: request.top_p.unwrap_or(self.config.top_p),
            frequency_penalty: self.config.frequency_penalty,
            presence_penalty: self.config.presence_penalty,
        }
    }

    async fn send(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&self.to_wire_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("connection failed: {e}"))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    /// Maps non-2xx statuses to errors, keeping the raw body for diagnostics.
    async fn check_status(response: Response) -> Result<Response, AIError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(AIError::AuthenticationFailed),
            429 => Err(AIError::RateLimited { retry_after_secs: 30 }),
            400 => Err(AIError::InvalidRequest(body)),
            500..=599 => Err(AIError::unavailable(format!("server error {status}: {body}"))),
            _ => Err(AIError::network(format!("unexpected status {status}: {body}"))),
        }
    }

    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
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
}

#[async_trait]
impl AIProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.send(&request).await?;
        let response = Self::check_status(response).await?;
        self.parse_response(response).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Flat $/1K-token rates expressed as cents per million tokens, with a
/// default for unknown models.
fn cost_cents(model: &str, total_tokens: u32) -> u32 {
    let cents_per_million: u64 = match model {
        m if m.starts_with("gpt-4o-mini") => 60,
        m if m.starts_with("gpt-4o") => 500,
        m if m.starts_with("gpt-4-turbo") => 2000,
        m if m.starts_with("gpt-4") => 4000,
        m if m.starts_with("gpt-3.5") => 100,
        _ => 1000,
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
    frequency_penalty: f32,
    presence_penalty: f32,
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

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::new(
            OpenAiConfig::new("test-key")
                .with_model("gpt-4o-mini")
                .with_base_url(server.uri()),
        )
        .unwrap()
    }

    fn completion_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        })
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = OpenAiProvider::new(OpenAiConfig::new("")).unwrap_err();
        assert!(matches!(err, AIError::AuthenticationFailed));
    }

    #[test]
    fn cost_table_has_default_rate() {
        assert_eq!(cost_cents("gpt-4o-mini", 1_000_000), 60);
        assert_eq!(cost_cents("gpt-4-turbo-2024", 1_000_000), 2000);
        assert_eq!(cost_cents("some-unknown-model", 1_000_000), 1000);
        assert_eq!(cost_cents("gpt-3.5-turbo", 100_000), 10);
    }

    #[tokio::test]
    async fn successful_completion_parses_content_and_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hello!")))
            .mount(&server)
            .await;

        let response = provider_for(&server)
            .complete(CompletionRequest::new().with_message(ChatRole::User, "hi"))
            .await
            .unwrap();

        assert_eq!(response.content, "Hello!");
        assert_eq!(response.usage.total_tokens, 15);
        assert_eq!(response.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(CompletionRequest::new().with_message(ChatRole::User, "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AIError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn server_error_carries_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(CompletionRequest::new().with_message(ChatRole::User, "hi"))
            .await
            .unwrap_err();

        match err {
            AIError::Unavailable { message } => assert!(message.contains("upstream overloaded")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(CompletionRequest::new().with_message(ChatRole::User, "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AIError::RateLimited { .. }));
    }
}
