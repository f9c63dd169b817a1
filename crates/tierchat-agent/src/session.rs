// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive chat session bound to one tier at a time.
//!
//! The generation service keeps no state between calls, so a session
//! carries its own turn history. The session is an explicit state machine:
//! `NoSession -> Bound(tier)`. Routing a message to a different tier tears
//! the bound session down and starts a fresh one; the first message of the
//! new session carries a preamble replaying recent transcript so the new
//! model sees the prior context.

use std::sync::Arc;
use std::time::Duration;

use tierchat_config::TierchatConfig;
use tierchat_core::types::{GenerationRequest, GenerationResponse, Turn, render_transcript};
use tierchat_core::{GenerationAdapter, Message, Role, Tier, TierchatError};
use tierchat_format::{citation_block, reflow, tidy_fences};
use tierchat_router::{RoutingDecision, TierSelector, TokenEstimate, estimate_tokens};
use tracing::{debug, info, warn};

use crate::extract::{ReplyStyle, extract_reply};
use crate::tier_generation_config;

/// A live session with the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundSession {
    pub tier: Tier,
    pub model: String,
    /// Turns already exchanged within this session.
    pub history: Vec<Turn>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    NoSession,
    Bound(BoundSession),
}

impl SessionState {
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Self::NoSession => None,
            Self::Bound(b) => Some(b.tier),
        }
    }
}

/// How a message was bound to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No session existed; a new one was created.
    Created,
    /// The existing session already serves the selected tier.
    Reused,
    /// The tier changed; the old session was dropped and a new one built.
    Rebuilt { from: Tier },
}

/// Binds `state` to `tier`, returning the session to use and how it was obtained.
pub fn transition(state: SessionState, tier: Tier, model: &str) -> (BoundSession, Transition) {
    let fresh = || BoundSession {
        tier,
        model: model.to_string(),
        history: Vec::new(),
    };
    match state {
        SessionState::NoSession => (fresh(), Transition::Created),
        SessionState::Bound(bound) if bound.tier == tier => (bound, Transition::Reused),
        SessionState::Bound(bound) => (fresh(), Transition::Rebuilt { from: bound.tier }),
    }
}

/// Replays the last `window` prior messages ahead of the current one.
pub fn context_preamble(prior: &[Message], current: &str, window: usize) -> String {
    let start = prior.len().saturating_sub(window);
    format!(
        "Previous conversation:\n{}\nCurrent message: {current}",
        render_transcript(&prior[start..])
    )
}

/// How replies are cleaned up before display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceMode {
    /// Unwrap fenced and indented code.
    Reflow,
    /// Keep fences, normalizing their markers.
    Keep,
}

/// Result of one interactive turn.
#[derive(Debug, Clone)]
pub struct SessionReply {
    /// Reply text with citations appended.
    pub text: String,
    pub decision: RoutingDecision,
    pub estimate: Option<TokenEstimate>,
    pub transition: Transition,
    /// Whether the outgoing message carried a history preamble.
    pub replayed_context: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub total: usize,
    pub user: usize,
}

/// Single-user chat session used by the interactive shell.
pub struct ChatSession {
    generator: Arc<dyn GenerationAdapter>,
    selector: TierSelector,
    state: SessionState,
    transcript: Vec<Message>,
    history_window: usize,
    system_instruction: String,
    token_count_model: String,
    timeout: Duration,
    fences: FenceMode,
}

/// Everything a turn produced before any session state is touched.
struct Exchange {
    decision: RoutingDecision,
    estimate: Option<TokenEstimate>,
    transition: Transition,
    replayed_context: bool,
    outgoing: String,
}

impl ChatSession {
    /// Builds a session using the shell routing overrides from `config`.
    pub fn new(
        config: &TierchatConfig,
        generator: Arc<dyn GenerationAdapter>,
        fences: FenceMode,
    ) -> Self {
        Self {
            generator,
            selector: TierSelector::new(config.shell.apply(&config.routing)),
            state: SessionState::NoSession,
            transcript: Vec::new(),
            history_window: config.conversation.max_chat_history,
            system_instruction: config.orchestrator.system_instruction.clone(),
            token_count_model: config.gemini.token_count_model.clone(),
            timeout: Duration::from_secs(config.orchestrator.timeout_secs),
            fences,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn selector(&self) -> &TierSelector {
        &self.selector
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            total: self.transcript.len(),
            user: self.transcript.iter().filter(|m| m.role == Role::User).count(),
        }
    }

    /// Drops the bound session and the whole transcript.
    pub fn reset(&mut self) {
        self.state = SessionState::NoSession;
        self.transcript.clear();
        info!("session reset");
    }

    /// Routes `text`, binds a session for its tier and sends it.
    ///
    /// Token estimation and generation share one deadline. On expiry a
    /// [`TierchatError::Timeout`] is returned and the transcript and bound
    /// session are left as they were. Any other failure records an
    /// `An error occurred: ...` reply in the transcript and is returned.
    pub async fn send(&mut self, text: &str) -> Result<SessionReply, TierchatError> {
        let exchanged =
            tokio::time::timeout(self.timeout, self.exchange(self.state.clone(), text)).await;
        let (mut bound, exchange, result) = match exchanged {
            Ok(exchanged) => exchanged,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "session turn timed out");
                return Err(TierchatError::Timeout {
                    duration: self.timeout,
                });
            }
        };

        if let Transition::Rebuilt { from } = exchange.transition {
            info!(
                from = %from,
                to = %exchange.decision.tier,
                replayed_context = exchange.replayed_context,
                "rebuilding session"
            );
        }
        self.transcript.push(Message::user(text));

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.state = SessionState::Bound(bound);
                self.transcript
                    .push(Message::assistant(format!("An error occurred: {e}")));
                return Err(e);
            }
        };
        let candidate = response.first();

        let raw = extract_reply(candidate, ReplyStyle::Markdown);
        let mut display = match self.fences {
            FenceMode::Reflow => reflow(&raw),
            FenceMode::Keep => tidy_fences(&raw),
        };
        let citation = citation_block(candidate.and_then(|c| c.grounding.as_ref()));
        if !citation.is_empty() {
            display.push_str("\n\n");
            display.push_str(&citation);
        }

        bound.history.push(Turn::user(exchange.outgoing));
        bound.history.push(Turn::assistant(raw));
        debug!(tier = %bound.tier, session_turns = bound.history.len(), "session turn complete");
        self.state = SessionState::Bound(bound);
        self.transcript.push(Message::assistant(display.as_str()));

        Ok(SessionReply {
            text: display,
            decision: exchange.decision,
            estimate: exchange.estimate,
            transition: exchange.transition,
            replayed_context: exchange.replayed_context,
        })
    }

    /// Estimates, routes, binds and calls the service without mutating `self`.
    async fn exchange(
        &self,
        state: SessionState,
        text: &str,
    ) -> (
        BoundSession,
        Exchange,
        Result<GenerationResponse, TierchatError>,
    ) {
        let prior_start = self.transcript.len().saturating_sub(self.history_window);
        let estimate = if self.selector.needs_token_estimate() {
            Some(
                estimate_tokens(
                    self.generator.as_ref(),
                    &self.token_count_model,
                    &self.transcript[prior_start..],
                    text,
                )
                .await,
            )
        } else {
            None
        };
        let decision = self.selector.route(text, estimate.map(|e| e.count));

        let (bound, transition) = transition(state, decision.tier, &decision.model);
        // A session that has not completed a turn yet has never seen the transcript.
        let replayed_context = bound.history.is_empty() && !self.transcript.is_empty();
        let outgoing = if replayed_context {
            context_preamble(&self.transcript, text, self.history_window)
        } else {
            text.to_string()
        };

        let mut turns = bound.history.clone();
        turns.push(Turn::user(outgoing.as_str()));
        let request = GenerationRequest {
            model: bound.model.clone(),
            turns,
            config: tier_generation_config(
                self.selector.binding(decision.tier),
                &self.system_instruction,
            ),
        };
        let result = self.generator.generate(request).await;

        let exchange = Exchange {
            decision,
            estimate,
            transition,
            replayed_context,
            outgoing,
        };
        (bound, exchange, result)
    }
}
