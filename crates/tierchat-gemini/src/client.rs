// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Generative Language API.
//!
//! Provides [`GeminiClient`] which handles URL construction, authentication
//! and error envelope parsing. Every call is a single attempt.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tierchat_core::TierchatError;
use tracing::debug;

use crate::types::{
    ApiErrorResponse, CountTokensRequest, CountTokensResponse, GenerateContentRequest,
    GenerateContentResponse,
};

/// HTTP client for Gemini API communication.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client that authenticates with `api_key` against `base_url`.
    pub fn new(
        api_key: &SecretString,
        base_url: &str,
        request_timeout: Duration,
    ) -> Result<Self, TierchatError> {
        let mut key = HeaderValue::from_str(api_key.expose_secret())
            .map_err(|e| TierchatError::Config(format!("invalid API key header value: {e}")))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", key);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()
            .map_err(|e| TierchatError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{model}:{method}", self.base_url)
    }

    /// `POST models/{model}:generateContent`.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, TierchatError> {
        self.post_json(&self.model_url(model, "generateContent"), request)
            .await
    }

    /// `POST models/{model}:countTokens`.
    pub async fn count_tokens(
        &self,
        model: &str,
        request: &CountTokensRequest,
    ) -> Result<CountTokensResponse, TierchatError> {
        self.post_json(&self.model_url(model, "countTokens"), request)
            .await
    }

    /// Posts `body` once and parses a 2xx reply.
    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, TierchatError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TierchatError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, url, "response received");

        let text = response.text().await.map_err(|e| TierchatError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        if !status.is_success() {
            return Err(TierchatError::provider(describe_error(status, &text)));
        }
        serde_json::from_str(&text).map_err(|e| TierchatError::Provider {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!(
            "Gemini API error {} ({}): {}",
            api_err.error.code, api_err.error.status, api_err.error.message
        ),
        Err(_) => format!("API returned {status}: {body}"),
    }
}
