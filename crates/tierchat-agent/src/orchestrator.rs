// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request orchestration for one chat turn.
//!
//! A turn runs `capacity check -> title -> route -> generate -> normalize ->
//! commit` under the per-key turn permit and a wall-clock deadline. Store
//! mutations are staged until generation succeeds, so a failed or timed-out
//! turn leaves the conversation untouched.

use std::sync::Arc;
use std::time::Duration;

use tierchat_config::TierchatConfig;
use tierchat_core::types::{GenerationRequest, Part, Turn, render_transcript};
use tierchat_core::{
    ConversationKey, ConversationStore, GenerationAdapter, Message, Role, Tier, TierchatError,
};
use tierchat_format::{citation_block, reflow};
use tierchat_router::{TierSelector, estimate_tokens};
use tracing::{debug, info, warn};

use crate::extract::{ReplyStyle, extract_reply};
use crate::tier_generation_config;
use crate::title::{sanitize_title, title_prompt};

/// Notice returned for a conversation that reached its message cap.
pub const LIMIT_NOTICE: &str = "Conversation limit is ended. Please start a new chat.";

/// Notice returned when a turn exceeds its deadline.
pub fn timeout_notice(timeout_secs: u64) -> String {
    format!("Query failed: process exceeded {timeout_secs} seconds.")
}

/// A completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub reply: String,
    pub title: Option<String>,
    pub tier: Tier,
    pub model: String,
    /// Bibliography block, empty when the answer was not grounded.
    pub citation: String,
}

/// What a turn produced. None of these are failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Reply(ChatReply),
    /// The conversation is frozen at its cap; nothing was generated.
    Capped { title: Option<String> },
    /// The deadline passed; nothing was stored.
    TimedOut,
}

/// Coordinates the store, the tier selector and the generation service.
pub struct Orchestrator {
    store: Arc<dyn ConversationStore>,
    generator: Arc<dyn GenerationAdapter>,
    selector: TierSelector,
    timeout: Duration,
    history_window: usize,
    title_model: String,
    title_max_words: usize,
    system_instruction: String,
    token_count_model: String,
}

impl Orchestrator {
    pub fn new(
        config: &TierchatConfig,
        store: Arc<dyn ConversationStore>,
        generator: Arc<dyn GenerationAdapter>,
    ) -> Self {
        Self {
            store,
            generator,
            selector: TierSelector::new(config.routing.clone()),
            timeout: Duration::from_secs(config.orchestrator.timeout_secs),
            history_window: config.conversation.max_chat_history,
            title_model: config.orchestrator.title_model.clone(),
            title_max_words: config.conversation.title_max_words,
            system_instruction: config.orchestrator.system_instruction.clone(),
            token_count_model: config.gemini.token_count_model.clone(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one turn for `key`.
    ///
    /// Generation failures surface as [`TierchatError::Provider`]; a turn
    /// that outlives the deadline becomes [`ChatOutcome::TimedOut`].
    pub async fn handle(
        &self,
        key: &ConversationKey,
        message: Message,
    ) -> Result<ChatOutcome, TierchatError> {
        match self.run_with_deadline(key, message).await {
            Err(TierchatError::Timeout { duration }) => {
                warn!(key = %key, ?duration, "chat turn timed out");
                Ok(ChatOutcome::TimedOut)
            }
            other => other,
        }
    }

    async fn run_with_deadline(
        &self,
        key: &ConversationKey,
        message: Message,
    ) -> Result<ChatOutcome, TierchatError> {
        tokio::time::timeout(self.timeout, self.run_turn(key, message))
            .await
            .map_err(|_| TierchatError::Timeout {
                duration: self.timeout,
            })?
    }

    async fn run_turn(
        &self,
        key: &ConversationKey,
        message: Message,
    ) -> Result<ChatOutcome, TierchatError> {
        let _permit = self.store.begin_turn(key).await?;

        let len = self.store.get_or_create(key).await?;
        let existing_title = self.store.snapshot(key).await?.and_then(|s| s.title);
        if len >= self.store.capacity() {
            info!(key = %key, len, "conversation at capacity, rejecting turn");
            return Ok(ChatOutcome::Capped {
                title: existing_title,
            });
        }

        let new_title = if len == 0 && message.role == Role::User && existing_title.is_none() {
            Some(self.generate_title(&message.content).await?)
        } else {
            None
        };

        let prior = self.store.recent_window(key, self.history_window).await?;

        let estimated_tokens = if self.selector.needs_token_estimate() {
            let estimate = estimate_tokens(
                self.generator.as_ref(),
                &self.token_count_model,
                &prior,
                &message.content,
            )
            .await;
            Some(estimate.count)
        } else {
            None
        };
        let decision = self.selector.route(&message.content, estimated_tokens);

        let skip = (prior.len() + 1).saturating_sub(self.history_window);
        let mut window: Vec<Message> = prior.into_iter().skip(skip).collect();
        window.push(message.clone());

        let request = GenerationRequest {
            model: decision.model.clone(),
            turns: vec![Turn::user(render_transcript(&window))],
            config: tier_generation_config(
                self.selector.binding(decision.tier),
                &self.system_instruction,
            ),
        };
        let response = self.generator.generate(request).await?;
        let candidate = response.first();

        let reply = reflow(&extract_reply(candidate, ReplyStyle::Plain));
        let citation = citation_block(candidate.and_then(|c| c.grounding.as_ref()));

        self.commit(key, new_title.as_deref(), message, &reply).await?;

        debug!(key = %key, tier = %decision.tier, reply_len = reply.len(), "turn complete");
        Ok(ChatOutcome::Reply(ChatReply {
            reply,
            title: new_title.or(existing_title),
            tier: decision.tier,
            model: decision.model,
            citation,
        }))
    }

    async fn generate_title(&self, first_message: &str) -> Result<String, TierchatError> {
        let response = self
            .generator
            .generate(GenerationRequest::prompt(
                self.title_model.as_str(),
                title_prompt(first_message),
            ))
            .await?;
        let raw = response
            .first()
            .and_then(|c| c.parts.first())
            .and_then(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .unwrap_or_default();
        let title = sanitize_title(raw, self.title_max_words);
        debug!(title = title.as_str(), "generated conversation title");
        Ok(title)
    }

    /// Writes the staged title and both messages.
    ///
    /// A conversation deleted mid-turn or filled by the user message is
    /// logged and skipped; the reply is still returned to the caller.
    async fn commit(
        &self,
        key: &ConversationKey,
        title: Option<&str>,
        user_message: Message,
        reply: &str,
    ) -> Result<(), TierchatError> {
        let result = async {
            if let Some(title) = title {
                self.store.assign_title_once(key, title).await?;
            }
            self.store.append(key, user_message).await?;
            self.store.append(key, Message::assistant(reply)).await
        }
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(e @ (TierchatError::NotFound { .. } | TierchatError::ConversationFull { .. })) => {
                warn!(key = %key, error = %e, "could not store completed turn");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tierchat_config::RoutingPolicy;
    use tierchat_core::types::{
        Candidate, FinishReason, GenerationResponse, GroundingChunk, GroundingMetadata,
        GroundingSupport, ToolKind, WebSource,
    };
    use tierchat_store::InMemoryStore;
    use tierchat_test_utils::{MockGenerator, test_config};

    fn setup(
        config: &TierchatConfig,
        mock: &MockGenerator,
    ) -> (Orchestrator, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new(config.conversation.max_total_messages));
        let orchestrator = Orchestrator::new(config, store.clone(), Arc::new(mock.clone()));
        (orchestrator, store)
    }

    fn key() -> ConversationKey {
        ConversationKey::new("u1", "c1")
    }

    fn reply(outcome: ChatOutcome) -> ChatReply {
        match outcome {
            ChatOutcome::Reply(r) => r,
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_message_gets_title_and_two_messages() {
        let mock = MockGenerator::with_texts(&["1. Derivative Basics", "A derivative measures change."]);
        let (orch, store) = setup(&test_config(), &mock);

        let r = reply(
            orch.handle(&key(), Message::user("What is a derivative?"))
                .await
                .unwrap(),
        );
        assert_eq!(r.title.as_deref(), Some("Derivative Basics"));
        assert_eq!(r.reply, "A derivative measures change.");
        assert!(r.tier >= Tier::Standard);
        assert_eq!(r.model, "gemini-2.5-flash");
        assert_eq!(r.citation, "");

        let snap = store.snapshot(&key()).await.unwrap().unwrap();
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.title.as_deref(), Some("Derivative Basics"));

        let requests = mock.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].model, "gemini-2.5-flash-lite");
        assert!(requests[0].config.tools.is_empty());
        assert_eq!(
            requests[1].config.tools,
            vec![ToolKind::CodeExecution, ToolKind::GoogleSearch]
        );
        assert_eq!(requests[1].config.top_k, Some(40));
        assert_eq!(requests[1].turns[0].text, "user: What is a derivative?\n");
    }

    #[tokio::test]
    async fn second_message_reuses_title_and_sends_history() {
        let mock = MockGenerator::with_texts(&["Greeting", "hello", "fine"]);
        let (orch, _store) = setup(&test_config(), &mock);

        orch.handle(&key(), Message::user("hi")).await.unwrap();
        let r = reply(orch.handle(&key(), Message::user("how are you")).await.unwrap());

        assert_eq!(r.title.as_deref(), Some("Greeting"));
        assert_eq!(r.tier, Tier::Lite);
        assert_eq!(mock.generate_calls(), 3);
        let last = mock.requests().await.pop().unwrap();
        assert_eq!(last.turns[0].text, "user: hi\nassistant: hello\nuser: how are you\n");
    }

    #[tokio::test]
    async fn assistant_authored_first_message_gets_no_title() {
        let mock = MockGenerator::with_texts(&["ok"]);
        let (orch, _store) = setup(&test_config(), &mock);

        let r = reply(orch.handle(&key(), Message::assistant("hello")).await.unwrap());
        assert_eq!(r.title, None);
        assert_eq!(mock.generate_calls(), 1);
    }

    #[tokio::test]
    async fn capped_conversation_is_rejected_without_generation() {
        let mut config = test_config();
        config.conversation.max_total_messages = 4;
        let mock = MockGenerator::new();
        let (orch, store) = setup(&config, &mock);

        orch.handle(&key(), Message::user("one")).await.unwrap();
        orch.handle(&key(), Message::user("two")).await.unwrap();
        let calls = mock.generate_calls();

        let outcome = orch.handle(&key(), Message::user("three")).await.unwrap();
        assert_eq!(
            outcome,
            ChatOutcome::Capped {
                title: Some("mock response".into())
            }
        );
        assert_eq!(mock.generate_calls(), calls);
        assert_eq!(store.snapshot(&key()).await.unwrap().unwrap().messages.len(), 4);
    }

    #[tokio::test]
    async fn generation_failure_leaves_conversation_untouched() {
        let mock = MockGenerator::new();
        mock.push_response(GenerationResponse::text("Title")).await;
        mock.push_failure("upstream exploded").await;
        let (orch, store) = setup(&test_config(), &mock);

        let err = orch.handle(&key(), Message::user("hi")).await.unwrap_err();
        assert!(err.to_string().contains("upstream exploded"));

        let snap = store.snapshot(&key()).await.unwrap().unwrap();
        assert!(snap.messages.is_empty());
        assert_eq!(snap.title, None);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_generation_times_out_without_mutation() {
        let mock = MockGenerator::new().with_delay(Duration::from_secs(30));
        let (orch, store) = setup(&test_config(), &mock);

        let outcome = orch.handle(&key(), Message::user("hi")).await.unwrap();
        assert_eq!(outcome, ChatOutcome::TimedOut);
        assert!(store.snapshot(&key()).await.unwrap().unwrap().messages.is_empty());
    }

    #[tokio::test]
    async fn grounded_reply_carries_citation_and_reflowed_code() {
        let grounded = GenerationResponse {
            candidates: vec![Candidate {
                parts: vec![Part::Text("See:\n```rust\nfn main() {}\n```".into())],
                finish_reason: Some(FinishReason::Stop),
                grounding: Some(GroundingMetadata {
                    supports: vec![GroundingSupport {
                        text: Some("See".into()),
                        chunk_indices: vec![0],
                    }],
                    chunks: vec![GroundingChunk {
                        web: Some(WebSource {
                            uri: Some("https://a.example".into()),
                            title: None,
                        }),
                    }],
                }),
            }],
        };
        let mock = MockGenerator::with_responses(vec![GenerationResponse::text("T"), grounded]);
        let (orch, _store) = setup(&test_config(), &mock);

        let r = reply(orch.handle(&key(), Message::user("hi")).await.unwrap());
        assert_eq!(r.reply, "See:\nfn main() {}");
        assert_eq!(r.citation, "Referensi:\n[1] https://a.example");
    }

    #[tokio::test]
    async fn three_tier_policy_counts_tokens_over_history() {
        let mut config = test_config();
        config.routing.policy = RoutingPolicy::ThreeTier;
        let mock = MockGenerator::new().with_token_count(5000);
        let (orch, _store) = setup(&config, &mock);

        let first = reply(orch.handle(&key(), Message::user("hi")).await.unwrap());
        assert_eq!(first.tier, Tier::Lite);
        assert_eq!(mock.count_calls(), 0);

        let second = reply(orch.handle(&key(), Message::user("and now")).await.unwrap());
        assert_eq!(second.tier, Tier::Pro);
        assert_eq!(
            mock.counted_texts().await,
            vec!["user: hi\nassistant: mock response\nuser: and now\n".to_string()]
        );
    }

    #[tokio::test]
    async fn prompt_window_is_bounded() {
        let mut config = test_config();
        config.conversation.max_chat_history = 3;
        let mock = MockGenerator::new();
        let (orch, _store) = setup(&config, &mock);

        orch.handle(&key(), Message::user("a")).await.unwrap();
        orch.handle(&key(), Message::user("b")).await.unwrap();
        let last = mock.requests().await.pop().unwrap();
        assert_eq!(last.turns[0].text, "user: a\nassistant: mock response\nuser: b\n");

        orch.handle(&key(), Message::user("c")).await.unwrap();
        let last = mock.requests().await.pop().unwrap();
        assert_eq!(last.turns[0].text, "user: b\nassistant: mock response\nuser: c\n");
    }
}
