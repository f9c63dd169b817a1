// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generative Language API request/response types and their mapping to the
//! adapter-neutral types in `tierchat-core`.

use serde::{Deserialize, Serialize};
use tierchat_core::Role;
use tierchat_core::types::{
    Candidate, FinishReason, GenerationRequest, GenerationResponse, GroundingChunk,
    GroundingMetadata, GroundingSupport, Part, ToolKind, WebSource,
};

// --- Shared ---

/// A role-tagged list of parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<ApiPart>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![ApiPart {
                text: Some(text.to_string()),
                ..ApiPart::default()
            }],
        }
    }
}

/// One part of a content block. Exactly one field is set in practice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_code: Option<ExecutableCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_execution_result: Option<CodeExecutionResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutableCode {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeExecutionResult {
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub output: Option<String>,
}

// --- generateContent request ---

/// Serializes as `{}`; tool entries are presence markers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyObject {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_execution: Option<EmptyObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_search: Option<EmptyObject>,
}

impl From<ToolKind> for ApiTool {
    fn from(kind: ToolKind) -> Self {
        match kind {
            ToolKind::CodeExecution => Self {
                code_execution: Some(EmptyObject {}),
                ..Self::default()
            },
            ToolKind::GoogleSearch => Self {
                google_search: Some(EmptyObject {}),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

/// Body of `POST /v1beta/models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ApiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<ApiGenerationConfig>,
}

fn api_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

impl From<&GenerationRequest> for GenerateContentRequest {
    fn from(request: &GenerationRequest) -> Self {
        let contents = request
            .turns
            .iter()
            .map(|turn| Content::text(Some(api_role(turn.role)), &turn.text))
            .collect();

        let cfg = &request.config;
        let generation_config = (cfg.temperature.is_some()
            || cfg.top_p.is_some()
            || cfg.top_k.is_some())
        .then(|| ApiGenerationConfig {
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            top_k: cfg.top_k,
        });

        Self {
            contents,
            system_instruction: cfg
                .system_instruction
                .as_deref()
                .map(|text| Content::text(None, text)),
            tools: cfg.tools.iter().copied().map(ApiTool::from).collect(),
            generation_config,
        }
    }
}

// --- generateContent response ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<ApiCandidate>,
    #[serde(default)]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCandidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub grounding_metadata: Option<ApiGroundingMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<ApiGroundingChunk>,
    #[serde(default)]
    pub grounding_supports: Vec<ApiGroundingSupport>,
    #[serde(default)]
    pub web_search_queries: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiGroundingChunk {
    #[serde(default)]
    pub web: Option<ApiWeb>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiWeb {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroundingSupport {
    #[serde(default)]
    pub segment: Option<ApiSegment>,
    #[serde(default)]
    pub grounding_chunk_indices: Vec<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSegment {
    #[serde(default)]
    pub text: Option<String>,
}

impl ApiPart {
    /// The neutral part this carries, if it is one the gateway understands.
    fn into_part(self) -> Option<Part> {
        if let Some(code) = self.executable_code {
            return Some(Part::ExecutableCode {
                language: code.language,
                code: code.code,
            });
        }
        if let Some(result) = self.code_execution_result {
            return Some(Part::CodeExecutionResult {
                outcome: result.outcome,
                output: result.output,
            });
        }
        self.text.map(Part::Text)
    }
}

impl From<ApiGroundingMetadata> for GroundingMetadata {
    fn from(meta: ApiGroundingMetadata) -> Self {
        Self {
            supports: meta
                .grounding_supports
                .into_iter()
                .map(|s| GroundingSupport {
                    text: s.segment.and_then(|seg| seg.text),
                    chunk_indices: s.grounding_chunk_indices,
                })
                .collect(),
            chunks: meta
                .grounding_chunks
                .into_iter()
                .map(|c| GroundingChunk {
                    web: c.web.map(|w| WebSource {
                        uri: w.uri,
                        title: w.title,
                    }),
                })
                .collect(),
        }
    }
}

impl From<GenerateContentResponse> for GenerationResponse {
    fn from(response: GenerateContentResponse) -> Self {
        let candidates = response
            .candidates
            .into_iter()
            .map(|c| Candidate {
                parts: c
                    .content
                    .map(|content| {
                        content
                            .parts
                            .into_iter()
                            .filter_map(ApiPart::into_part)
                            .collect()
                    })
                    .unwrap_or_default(),
                finish_reason: c.finish_reason.as_deref().map(FinishReason::parse),
                grounding: c.grounding_metadata.map(GroundingMetadata::from),
            })
            .collect();
        Self { candidates }
    }
}

// --- countTokens ---

/// Body of `POST /v1beta/models/{model}:countTokens`.
#[derive(Debug, Clone, Serialize)]
pub struct CountTokensRequest {
    pub contents: Vec<Content>,
}

impl CountTokensRequest {
    pub fn text(text: &str) -> Self {
        Self {
            contents: vec![Content::text(Some("user"), text)],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensResponse {
    #[serde(default)]
    pub total_tokens: u64,
}

// --- Errors ---

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}
