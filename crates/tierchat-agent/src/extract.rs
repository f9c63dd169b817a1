// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns a generated candidate into displayable reply text.

use tierchat_core::types::{Candidate, FinishReason, Part};

/// Placeholder used when a candidate yields no displayable text.
pub const APOLOGY: &str =
    "I apologize, but I couldn't generate a proper response. Please try again.";

/// How code and execution output parts are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStyle {
    /// Parts are concatenated as-is; output is prefixed with `Output: `.
    Plain,
    /// Code and output are wrapped in fences for markdown surfaces.
    Markdown,
}

/// Concatenates the displayable parts of `candidate`.
///
/// Text parts are always kept. Executable code and execution output are
/// only user-facing when the candidate finished with `STOP`; otherwise they
/// were internal tool use and are dropped. Returns [`APOLOGY`] when nothing
/// displayable remains.
pub fn extract_reply(candidate: Option<&Candidate>, style: ReplyStyle) -> String {
    let Some(candidate) = candidate else {
        return APOLOGY.to_string();
    };
    let stopped = candidate.finish_reason == Some(FinishReason::Stop);

    let mut reply = String::new();
    for part in &candidate.parts {
        match part {
            Part::Text(text) => reply.push_str(text),
            Part::ExecutableCode { code, .. } if stopped => match style {
                ReplyStyle::Plain => reply.push_str(code),
                ReplyStyle::Markdown => reply.push_str(&format!("\n```\n{code}\n```\n")),
            },
            Part::CodeExecutionResult {
                output: Some(output),
                ..
            } if stopped && !output.is_empty() => match style {
                ReplyStyle::Plain => reply.push_str(&format!("Output: {output}")),
                ReplyStyle::Markdown => {
                    reply.push_str(&format!("\n**Output:**\n```\n{output}\n```\n"))
                }
            },
            _ => {}
        }
    }

    if reply.trim().is_empty() {
        APOLOGY.to_string()
    } else {
        reply
    }
}
