// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tierchat gateway.

use thiserror::Error;

/// The primary error type used across all Tierchat adapter traits and core operations.
#[derive(Debug, Error)]
pub enum TierchatError {
    /// Configuration errors (invalid TOML, missing credential, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The conversation reached its message cap and is frozen.
    #[error("conversation is full ({limit} messages)")]
    ConversationFull { limit: usize },

    /// No conversation exists for the given key.
    #[error("conversation not found: {user_id}/{chat_id}")]
    NotFound { user_id: String, chat_id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Generation service errors (API failure, malformed response, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TierchatError {
    /// Shorthand for a provider error without an underlying cause.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }
}
