// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini generation adapter for the Tierchat gateway.
//!
//! This crate implements [`GenerationAdapter`] on top of the Generative
//! Language REST API: `generateContent` for replies and `countTokens` for
//! the three-tier token estimate.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use tierchat_config::model::GeminiConfig;
use tierchat_core::TierchatError;
use tierchat_core::traits::{GenerationAdapter, PluginAdapter};
use tierchat_core::types::{AdapterType, GenerationRequest, GenerationResponse, HealthStatus};
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::types::{CountTokensRequest, GenerateContentRequest};

/// Gemini provider implementing [`GenerationAdapter`].
///
/// API key resolution order: `gemini.api_key` (which the config loader also
/// fills from `GEMINI_API_KEY`) -> error.
pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    /// Creates a provider from the `[gemini]` config section.
    pub fn new(config: &GeminiConfig) -> Result<Self, TierchatError> {
        let api_key = resolve_api_key(config)?;
        let client = GeminiClient::new(
            &api_key,
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;

        info!(base_url = %config.base_url, "Gemini provider initialized");
        Ok(Self { client })
    }
}

/// Returns the configured API key, rejecting a missing or blank one.
pub fn resolve_api_key(config: &GeminiConfig) -> Result<SecretString, TierchatError> {
    match config.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(SecretString::from(key.to_string())),
        _ => Err(TierchatError::Config(
            "Gemini API key not found. Set gemini.api_key in config or the \
             GEMINI_API_KEY environment variable."
                .into(),
        )),
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
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
impl GenerationAdapter for GeminiProvider {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, TierchatError> {
        let body = GenerateContentRequest::from(&request);
        debug!(
            model = %request.model,
            turns = request.turns.len(),
            tools = body.tools.len(),
            "sending generateContent"
        );
        let response = self.client.generate_content(&request.model, &body).await?;
        Ok(response.into())
    }

    async fn count_tokens(&self, model: &str, text: &str) -> Result<u64, TierchatError> {
        let response = self
            .client
            .count_tokens(model, &CountTokensRequest::text(text))
            .await?;
        Ok(response.total_tokens)
    }
}
