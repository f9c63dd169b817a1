// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation adapter for deterministic testing.
//!
//! Responses are popped from a FIFO queue; when the queue is empty a plain
//! "mock response" text candidate is returned. Every request is recorded so
//! tests can assert on model choice, sampling parameters and prompt text.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tierchat_core::types::{
    AdapterType, GenerationRequest, GenerationResponse, HealthStatus,
};
use tierchat_core::{GenerationAdapter, PluginAdapter, TierchatError};

type Scripted = Result<GenerationResponse, String>;

/// A scripted generation adapter. Clones share all state.
#[derive(Clone)]
pub struct MockGenerator {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    counted: Arc<Mutex<Vec<String>>>,
    generate_calls: Arc<AtomicUsize>,
    count_calls: Arc<AtomicUsize>,
    token_count: Option<u64>,
    delay: Option<Duration>,
}

impl MockGenerator {
    /// Empty queue, token counting returns 10.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            counted: Arc::new(Mutex::new(Vec::new())),
            generate_calls: Arc::new(AtomicUsize::new(0)),
            count_calls: Arc::new(AtomicUsize::new(0)),
            token_count: Some(10),
            delay: None,
        }
    }

    /// Pre-load single-candidate text responses.
    pub fn with_texts(texts: &[&str]) -> Self {
        let mock = Self::new();
        if let Ok(mut queue) = mock.responses.try_lock() {
            queue.extend(texts.iter().map(|t| Ok(GenerationResponse::text(*t))));
        }
        mock
    }

    /// Pre-load full responses.
    pub fn with_responses(responses: Vec<GenerationResponse>) -> Self {
        let mock = Self::new();
        if let Ok(mut queue) = mock.responses.try_lock() {
            queue.extend(responses.into_iter().map(Ok));
        }
        mock
    }

    /// Sleep this long inside every `generate` call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Value returned by `count_tokens`.
    pub fn with_token_count(mut self, count: u64) -> Self {
        self.token_count = Some(count);
        self
    }

    /// Make every `count_tokens` call fail.
    pub fn failing_token_count(mut self) -> Self {
        self.token_count = None;
        self
    }

    pub async fn push_response(&self, response: GenerationResponse) {
        self.responses.lock().await.push_back(Ok(response));
    }

    /// Queue a provider error for the next `generate` call.
    pub async fn push_failure(&self, message: &str) {
        self.responses
            .lock()
            .await
            .push_back(Err(message.to_string()));
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    /// Every request passed to `generate`, oldest first.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }

    /// Every text passed to `count_tokens`, oldest first.
    pub async fn counted_texts(&self) -> Vec<String> {
        self.counted.lock().await.clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, TierchatError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl GenerationAdapter for MockGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, TierchatError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.responses.lock().await.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TierchatError::provider(message)),
            None => Ok(GenerationResponse::text("mock response")),
        }
    }

    async fn count_tokens(&self, _model: &str, text: &str) -> Result<u64, TierchatError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.counted.lock().await.push(text.to_string());
        self.token_count
            .ok_or_else(|| TierchatError::provider("token counting unavailable"))
    }
}
