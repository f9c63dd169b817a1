// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort token estimation for the three-tier policy.

use tierchat_core::types::render_transcript;
use tierchat_core::{GenerationAdapter, Message};
use tracing::{debug, warn};

/// A token count and whether it came from the service or the heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEstimate {
    pub count: u64,
    pub approximate: bool,
}

/// Roughly four characters per token.
pub fn approximate_tokens(text: &str) -> u64 {
    (text.chars().count() / 4) as u64
}

/// Estimate the tokens of `window` (prior messages, oldest first) plus the
/// current user message.
///
/// An empty window is estimated locally without a service call. Service
/// failures fall back to the character heuristic and never fail the caller.
pub async fn estimate_tokens(
    generator: &dyn GenerationAdapter,
    model: &str,
    window: &[Message],
    current: &str,
) -> TokenEstimate {
    if window.is_empty() {
        return TokenEstimate {
            count: approximate_tokens(current),
            approximate: true,
        };
    }

    let prompt = format!("{}user: {current}\n", render_transcript(window));
    match generator.count_tokens(model, &prompt).await {
        Ok(count) => {
            debug!(count, model, "token count from service");
            TokenEstimate {
                count,
                approximate: false,
            }
        }
        Err(e) => {
            let count = approximate_tokens(&prompt);
            warn!(error = %e, count, "token counting failed, using approximation");
            TokenEstimate {
                count,
                approximate: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tierchat_test_utils::MockGenerator;

    #[test]
    fn approximation_counts_characters_not_bytes() {
        assert_eq!(approximate_tokens("abcdefgh"), 2);
        assert_eq!(approximate_tokens("ééééééé"), 1);
        assert_eq!(approximate_tokens(""), 0);
    }

    #[tokio::test]
    async fn empty_window_skips_service() {
        let mock = MockGenerator::new();
        let estimate = estimate_tokens(&mock, "lite", &[], "twelve chars").await;
        assert_eq!(estimate, TokenEstimate { count: 3, approximate: true });
        assert_eq!(mock.count_calls(), 0);
    }

    #[tokio::test]
    async fn service_count_is_used_when_available() {
        let mock = MockGenerator::new().with_token_count(4321);
        let window = vec![Message::user("hi"), Message::assistant("hello")];
        let estimate = estimate_tokens(&mock, "lite", &window, "more").await;
        assert_eq!(estimate, TokenEstimate { count: 4321, approximate: false });
        assert_eq!(
            mock.counted_texts().await,
            vec!["user: hi\nassistant: hello\nuser: more\n".to_string()]
        );
    }

    #[tokio::test]
    async fn service_failure_falls_back_to_heuristic() {
        let mock = MockGenerator::new().failing_token_count();
        let window = vec![Message::user("abcd")];
        let estimate = estimate_tokens(&mock, "lite", &window, "efgh").await;
        // "user: abcd\nuser: efgh\n" is 22 characters.
        assert_eq!(estimate, TokenEstimate { count: 5, approximate: true });
    }
}
