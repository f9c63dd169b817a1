// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Tierchat gateway.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Who authored a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single immutable chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Renders messages as `role: content` lines, one per message.
pub fn render_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}\n", m.role, m.content))
        .collect()
}

/// Identifies one conversation: an opaque user id plus an opaque chat id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationKey {
    pub user_id: String,
    pub chat_id: String,
}

impl ConversationKey {
    pub fn new(user_id: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            chat_id: chat_id.into(),
        }
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user_id, self.chat_id)
    }
}

/// A generation-capability level, ordered `Lite < Standard < Pro`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    Lite,
    Standard,
    Pro,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Generation,
    Store,
}

// --- Generation request types ---

/// Server-side tools the generation service may use while answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Web search used to ground answers; produces grounding metadata.
    GoogleSearch,
    /// Sandboxed code execution; produces executable code and result parts.
    CodeExecution,
}

/// Per-call generation settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationConfig {
    pub system_instruction: Option<String>,
    pub tools: Vec<ToolKind>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
}

/// One turn of input sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// A request to the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub turns: Vec<Turn>,
    pub config: GenerationConfig,
}

impl GenerationRequest {
    /// A bare single-turn prompt with default settings.
    pub fn prompt(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            turns: vec![Turn::user(text)],
            config: GenerationConfig::default(),
        }
    }
}

// --- Generation response types ---

/// One piece of candidate content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    ExecutableCode { language: String, code: String },
    CodeExecutionResult { outcome: String, output: Option<String> },
}

/// Why the service stopped producing a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    /// Natural end of a user-facing answer.
    Stop,
    /// Any other reason reported by the service (max tokens, safety, ...).
    Other(String),
}

impl FinishReason {
    pub fn parse(raw: &str) -> Self {
        if raw == "STOP" {
            Self::Stop
        } else {
            Self::Other(raw.to_string())
        }
    }
}

/// A web source a grounding chunk points at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WebSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

/// A retrieved source document. Non-web chunks carry no `web` entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

/// Links a span of generated text to the chunks that support it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroundingSupport {
    pub text: Option<String>,
    pub chunk_indices: Vec<usize>,
}

/// Evidence returned alongside a grounded answer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroundingMetadata {
    pub supports: Vec<GroundingSupport>,
    pub chunks: Vec<GroundingChunk>,
}

/// A single generated candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub parts: Vec<Part>,
    pub finish_reason: Option<FinishReason>,
    pub grounding: Option<GroundingMetadata>,
}

/// A response from the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationResponse {
    pub candidates: Vec<Candidate>,
}

impl GenerationResponse {
    /// The first candidate, which is the only one the gateway ever reads.
    pub fn first(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Convenience constructor for a single finished text candidate.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                parts: vec![Part::Text(text.into())],
                finish_reason: Some(FinishReason::Stop),
                grounding: None,
            }],
        }
    }
}

// --- Store view types ---

/// A consistent copy of one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSnapshot {
    pub title: Option<String>,
    pub messages: Vec<Message>,
}

/// One entry of a user's chat listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSummary {
    pub chat_id: String,
    pub title: Option<String>,
}
