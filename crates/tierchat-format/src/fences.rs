// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fence tidying for markdown-capable surfaces.

use std::sync::LazyLock;

use regex::Regex;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(\w*)\s*\n").expect("valid fence pattern"));
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)```\s*$").expect("valid fence pattern"));

/// Keep fenced blocks but drop stray whitespace after opening language tags
/// and after closing markers.
pub fn tidy_fences(text: &str) -> String {
    let opened = OPENING_FENCE.replace_all(text, "```${1}\n");
    CLOSING_FENCE.replace_all(&opened, "```").into_owned()
}
