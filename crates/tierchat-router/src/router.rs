// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier selection from a complexity score and an optional token estimate.

use tierchat_config::{RoutingConfig, RoutingPolicy, TierConfig};
use tierchat_core::Tier;
use tracing::info;

use crate::classifier::{ComplexityClassifier, ScoreBreakdown, ScoreWeights};

/// Outcome of routing one message.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub tier: Tier,
    /// Model bound to `tier`.
    pub model: String,
    pub breakdown: ScoreBreakdown,
    /// Token estimate the decision used, if the policy asked for one.
    pub estimated_tokens: Option<u64>,
    /// Human-readable reason for the decision.
    pub reason: &'static str,
}

impl RoutingDecision {
    pub fn score(&self) -> u32 {
        self.breakdown.score
    }
}

/// Maps scores to tiers under a two-tier or three-tier policy.
#[derive(Debug, Clone)]
pub struct TierSelector {
    classifier: ComplexityClassifier,
    config: RoutingConfig,
}

impl TierSelector {
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            classifier: ComplexityClassifier::new(ScoreWeights::from(&config)),
            config,
        }
    }

    pub fn policy(&self) -> RoutingPolicy {
        self.config.policy
    }

    /// Whether [`TierSelector::select`] looks at a token estimate at all.
    pub fn needs_token_estimate(&self) -> bool {
        self.config.policy == RoutingPolicy::ThreeTier
    }

    pub fn classifier(&self) -> &ComplexityClassifier {
        &self.classifier
    }

    /// Model and sampling parameters bound to `tier`.
    pub fn binding(&self, tier: Tier) -> &TierConfig {
        self.config.tier(tier)
    }

    /// Pick a tier. Thresholds are inclusive; the token threshold is strict.
    pub fn select(&self, score: u32, estimated_tokens: Option<u64>) -> Tier {
        self.select_with_reason(score, estimated_tokens).0
    }

    fn select_with_reason(&self, score: u32, estimated_tokens: Option<u64>) -> (Tier, &'static str) {
        let cfg = &self.config;
        if cfg.policy == RoutingPolicy::ThreeTier {
            if score >= cfg.top_threshold {
                return (Tier::Pro, "score at or above top threshold");
            }
            if estimated_tokens.is_some_and(|t| t > cfg.token_threshold) {
                return (Tier::Pro, "estimated tokens above threshold");
            }
        }
        if score >= cfg.medium_threshold {
            (Tier::Standard, "score at or above medium threshold")
        } else {
            (Tier::Lite, "score below medium threshold")
        }
    }

    /// Score `message` and select its tier.
    pub fn route(&self, message: &str, estimated_tokens: Option<u64>) -> RoutingDecision {
        let breakdown = self.classifier.breakdown(message);
        let (tier, reason) = self.select_with_reason(breakdown.score, estimated_tokens);
        let model = self.binding(tier).model.clone();

        info!(
            score = breakdown.score,
            estimated_tokens = ?estimated_tokens,
            tier = %tier,
            model = model.as_str(),
            reason,
            "routed message"
        );

        RoutingDecision {
            tier,
            model,
            breakdown,
            estimated_tokens,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tier() -> TierSelector {
        TierSelector::new(RoutingConfig::default())
    }

    fn three_tier(medium_threshold: u32) -> TierSelector {
        TierSelector::new(RoutingConfig {
            policy: RoutingPolicy::ThreeTier,
            medium_threshold,
            ..RoutingConfig::default()
        })
    }

    #[test]
    fn two_tier_threshold_is_inclusive() {
        let s = two_tier();
        assert_eq!(s.select(6, None), Tier::Lite);
        assert_eq!(s.select(7, None), Tier::Standard);
        assert_eq!(s.select(40, None), Tier::Standard);
    }

    #[test]
    fn two_tier_ignores_tokens() {
        let s = two_tier();
        assert!(!s.needs_token_estimate());
        assert_eq!(s.select(1, Some(1_000_000)), Tier::Lite);
    }

    #[test]
    fn three_tier_top_threshold_is_inclusive() {
        let s = three_tier(5);
        assert_eq!(s.select(9, Some(0)), Tier::Standard);
        assert_eq!(s.select(10, Some(0)), Tier::Pro);
    }

    #[test]
    fn three_tier_token_threshold_is_strict() {
        let s = three_tier(5);
        assert_eq!(s.select(1, Some(3000)), Tier::Lite);
        assert_eq!(s.select(1, Some(3001)), Tier::Pro);
    }

    #[test]
    fn three_tier_medium_band() {
        let s = three_tier(5);
        assert_eq!(s.select(4, None), Tier::Lite);
        assert_eq!(s.select(5, None), Tier::Standard);
    }

    #[test]
    fn route_binds_model_and_reason() {
        let decision = two_tier().route("What is a derivative?", None);
        assert_eq!(decision.score(), 8);
        assert_eq!(decision.tier, Tier::Standard);
        assert_eq!(decision.model, "gemini-2.5-flash");
        assert_eq!(decision.reason, "score at or above medium threshold");
    }

    #[test]
    fn route_reports_token_driven_upgrade() {
        let decision = three_tier(5).route("hi", Some(5000));
        assert_eq!(decision.tier, Tier::Pro);
        assert_eq!(decision.model, "gemini-2.5-pro");
        assert_eq!(decision.reason, "estimated tokens above threshold");
    }
}
