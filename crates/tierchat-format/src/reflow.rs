// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Code-block reflow for plain-text clients.
//!
//! Fenced blocks are replaced by their trimmed body and indented code lines
//! lose their leading whitespace. Language tags and indentation are not
//! preserved.

use std::sync::LazyLock;

use regex::Regex;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```([a-zA-Z0-9]*)\n([\s\S]*?)```").expect("valid fence pattern")
});

/// Unwrap code blocks in `text`.
///
/// Repeats until nothing changes, so `reflow(reflow(x)) == reflow(x)`.
pub fn reflow(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = dedent_code_lines(&unwrap_fences(&current));
        // Both passes only ever remove characters, so this terminates.
        if next == current {
            return current;
        }
        current = next;
    }
}

fn unwrap_fences(text: &str) -> String {
    FENCED_BLOCK
        .replace_all(text, |caps: &regex::Captures<'_>| caps[2].trim().to_string())
        .into_owned()
}

/// Lines opening with four spaces or a tab are indented code.
fn dedent_code_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.starts_with("    ") || line.starts_with('\t') {
                line.trim_start()
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fenced_block_becomes_trimmed_body() {
        let input = "Here:\n```python\nprint('hi')\n```\nDone.";
        assert_eq!(reflow(input), "Here:\nprint('hi')\nDone.");
    }

    #[test]
    fn fence_without_language_is_unwrapped() {
        assert_eq!(reflow("```\n  x = 1  \n```"), "x = 1");
    }

    #[test]
    fn several_fences_are_unwrapped_independently() {
        let input = "```js\na()\n```\ntext\n```rs\nb()\n```";
        assert_eq!(reflow(input), "a()\ntext\nb()");
    }

    #[test]
    fn indented_runs_are_dedented() {
        let input = "Example:\n    fn main() {\n        run();\n\t}\nafter";
        assert_eq!(reflow(input), "Example:\nfn main() {\nrun();\n}\nafter");
    }

    #[test]
    fn short_indentation_is_kept() {
        let input = "  two spaces stay\n   three too";
        assert_eq!(reflow(input), input);
    }

    #[test]
    fn unclosed_fence_is_left_alone() {
        let input = "```python\nprint(1)";
        assert_eq!(reflow(input), input);
    }

    #[test]
    fn plain_text_is_unchanged() {
        let input = "No code here.\n\nJust prose [1].";
        assert_eq!(reflow(input), input);
    }

    proptest! {
        #[test]
        fn reflow_is_idempotent(text in "[`a-c0-9 \t\n]{0,80}") {
            let once = reflow(&text);
            prop_assert_eq!(reflow(&once), once);
        }

        #[test]
        fn reflow_never_grows_text(text in "[`a-z \t\n]{0,80}") {
            prop_assert!(reflow(&text).len() <= text.len());
        }
    }
}
