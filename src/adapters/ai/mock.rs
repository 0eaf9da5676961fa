//! Scripted mock provider for tests.
//!
//! Responses and errors are queued ahead of time and consumed in order;
//! the mock also counts requests so fallback behavior can be asserted.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, TokenUsage};

/// Queue-driven fake backend.
pub struct MockProvider {
    name: String,
    script: Mutex<VecDeque<Result<CompletionResponse, AIError>>>,
    requests: AtomicUsize,
    /// Served when the script runs dry instead of panicking mid-test.
    default_content: Mutex<Option<String>>,
}

impl MockProvider {
    /// Creates a mock named "mock".
    pub fn new() -> Self {
        Self::named("mock")
    }

    /// Creates a mock with an explicit backend name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
            requests: AtomicUsize::new(0),
            default_content: Mutex::new(None),
        }
    }

    /// Queues a successful completion with zero usage.
    pub fn push_content(&self, content: impl Into<String>) {
        self.push_response(content, TokenUsage::zero());
    }

    /// Queues a successful completion with explicit usage.
    pub fn push_response(&self, content: impl Into<String>, usage: TokenUsage) {
        self.script.lock().unwrap().push_back(Ok(CompletionResponse {
            content: content.into(),
            usage,
            model: format!("{}-model", self.name),
        }));
    }

    /// Queues an error.
    pub fn push_error(&self, error: AIError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Serves this content whenever the script is empty.
    pub fn set_default_content(&self, content: impl Into<String>) {
        *self.default_content.lock().unwrap() = Some(content.into());
    }

    /// Number of completion requests received.
    pub fn requests_seen(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AIProvider for MockProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if let Some(scripted) = self.script.lock().unwrap().pop_front() {
            return scripted;
        }
        if let Some(content) = self.default_content.lock().unwrap().clone() {
            return Ok(CompletionResponse {
                content,
                usage: TokenUsage::zero(),
                model: format!("{}-model", self.name),
            });
        }
        Err(AIError::unavailable("mock script exhausted"))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
