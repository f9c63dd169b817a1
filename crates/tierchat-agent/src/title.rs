// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation titles generated from the first user message.

/// Characters stripped from the start of a generated title (bullets, numbering).
const LEADING_JUNK: &[char] = &['-', '*', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', ' '];

/// Prompt for the one-off title call.
pub fn title_prompt(first_message: &str) -> String {
    format!(
        "Generate a single, short, and concise title (max 5 words, no explanation) \
         for this conversation: {first_message}"
    )
}

/// Keeps the first line of `raw`, strips list markers, and caps it at
/// `max_words` words.
pub fn sanitize_title(raw: &str, max_words: usize) -> String {
    let first_line = raw.trim().lines().next().unwrap_or_default();
    first_line
        .trim_start_matches(LEADING_JUNK)
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}
