// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation adapter trait for hosted text-generation services.

use async_trait::async_trait;

use crate::error::TierchatError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GenerationRequest, GenerationResponse};

/// Adapter for a hosted text-generation service.
///
/// Implementations translate [`GenerationRequest`] into the service's wire
/// format and map its reply back into tagged [`crate::types::Part`] values.
#[async_trait]
pub trait GenerationAdapter: PluginAdapter {
    /// Sends a generation request and returns the full response.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, TierchatError>;

    /// Counts the tokens `text` would occupy for `model`.
    ///
    /// Callers treat this as best-effort and fall back to a heuristic on error.
    async fn count_tokens(&self, model: &str, text: &str) -> Result<u64, TierchatError>;
}
