// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat turn orchestration for the Tierchat gateway.
//!
//! - [`Orchestrator`]: stateless-client turns against the shared store
//!   (HTTP surface)
//! - [`ChatSession`]: a single-user session state machine that rebinds on
//!   tier changes (interactive shell)

pub mod extract;
pub mod orchestrator;
pub mod session;
pub mod title;

pub use extract::{APOLOGY, ReplyStyle, extract_reply};
pub use orchestrator::{ChatOutcome, ChatReply, LIMIT_NOTICE, Orchestrator, timeout_notice};
pub use session::{
    BoundSession, ChatSession, FenceMode, SessionReply, SessionState, SessionStats, Transition,
};

use tierchat_config::TierConfig;
use tierchat_core::types::{GenerationConfig, ToolKind};

/// Generation settings for a tier: its sampling parameters, both tools and
/// the system instruction.
pub(crate) fn tier_generation_config(binding: &TierConfig, system_instruction: &str) -> GenerationConfig {
    GenerationConfig {
        system_instruction: Some(system_instruction.to_string()),
        tools: vec![ToolKind::CodeExecution, ToolKind::GoogleSearch],
        temperature: Some(binding.temperature),
        top_p: Some(binding.top_p),
        top_k: Some(binding.top_k),
    }
}
