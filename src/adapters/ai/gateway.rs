//! Provider gateway - ordered fallback across interchangeable backends.
//!
//! Backends are tried in declaration order with a uniform contract; the
//! first success wins. The result records which backend served the request
//! so the orchestrator can flag fallbacks in message metadata. Failover is
//! the only retry: there is no retry-with-backoff against a single backend,
//! and errors no other backend could serve ([`AIError::is_retryable`] is
//! false) end the chain immediately.

use std::sync::Arc;

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse};

/// A completion together with provenance.
#[derive(Debug, Clone)]
pub struct GatewayCompletion {
    /// The completion itself.
    pub response: CompletionResponse,
    /// Name of the backend that served it.
    pub provider: String,
    /// True when any earlier backend failed first.
    pub fell_back: bool,
}

/// Ordered chain of chat-completion backends.
pub struct ProviderGateway {
    backends: Vec<Arc<dyn AIProvider>>,
}

impl ProviderGateway {
    /// Creates a gateway over backends in fallback order.
    pub fn new(backends: Vec<Arc<dyn AIProvider>>) -> Self {
        Self { backends }
    }

    /// Creates a gateway with a single backend.
    pub fn single(backend: Arc<dyn AIProvider>) -> Self {
        Self::new(vec![backend])
    }

    /// True when no backend is configured.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Runs the request through the chain, short-circuiting on the first
    /// success. Every failure is logged with its backend; retryable
    /// failures move on to the next backend, anything else is final.
    pub async fn complete(&self, request: CompletionRequest) -> Result<GatewayCompletion, AIError> {
        if self.backends.is_empty() {
            return Err(AIError::NoModelAvailable);
        }

        let mut last_error = AIError::NoModelAvailable;
        for (index, backend) in self.backends.iter().enumerate() {
            match backend.complete(request.clone()).await {
                Ok(response) => {
                    if index > 0 {
                        tracing::info!(
                            provider = backend.name(),
                            skipped = index,
                            "completion served by fallback backend"
                        );
                    }
                    return Ok(GatewayCompletion {
                        response,
                        provider: backend.name().to_string(),
                        fell_back: index > 0,
                    });
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(
                        provider = backend.name(),
                        error = %err,
                        "backend failed, trying next"
                    );
                    last_error = err;
                }
                Err(err) => {
                    tracing::warn!(
                        provider = backend.name(),
                        error = %err,
                        "non-retryable failure, not failing over"
                    );
                    return Err(err);
                }
            }
        }

        Err(last_error)
    }
}
