// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Tierchat gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use tierchat_core::Tier;

/// Top-level Tierchat configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to the values the gateway ships with.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TierchatConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Complexity scoring and tier selection.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Conversation store limits.
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Request pipeline settings.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Interactive shell overrides.
    #[serde(default)]
    pub shell: ShellConfig,
}

impl TierchatConfig {
    /// Copy of this config with secrets replaced, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.gemini.api_key.is_some() {
            copy.gemini.api_key = Some("[REDACTED]".to_string());
        }
        copy
    }
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Gemini API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `None` falls back to the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the Generative Language API.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Per-HTTP-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Model used for token counting.
    #[serde(default = "default_lite_model")]
    pub token_count_model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("token_count_model", &self.token_count_model)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            token_count_model: default_lite_model(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_lite_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

/// How many tiers the selector chooses between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingPolicy {
    /// Lite or standard, by score only.
    TwoTier,
    /// Lite, standard or pro, by score and estimated token count.
    ThreeTier,
}

/// Complexity scoring and tier selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Selection policy.
    #[serde(default = "default_policy")]
    pub policy: RoutingPolicy,

    /// Minimum score (inclusive) for the standard tier.
    #[serde(default = "default_medium_threshold")]
    pub medium_threshold: u32,

    /// Minimum score (inclusive) for the pro tier. Three-tier only.
    #[serde(default = "default_top_threshold")]
    pub top_threshold: u32,

    /// Estimated token count above which the pro tier is chosen. Three-tier only.
    #[serde(default = "default_token_threshold")]
    pub token_threshold: u64,

    /// Score added per hard-keyword match.
    #[serde(default = "default_weight_hard")]
    pub weight_hard: u32,

    /// Score added per medium-keyword match.
    #[serde(default = "default_weight_medium")]
    pub weight_medium: u32,

    /// Score added per `?`.
    #[serde(default = "default_weight_small")]
    pub weight_small: u32,

    #[serde(default = "default_lite_tier")]
    pub lite: TierConfig,

    #[serde(default = "default_standard_tier")]
    pub standard: TierConfig,

    #[serde(default = "default_pro_tier")]
    pub pro: TierConfig,
}

impl RoutingConfig {
    /// The binding for a tier.
    pub fn tier(&self, tier: Tier) -> &TierConfig {
        match tier {
            Tier::Lite => &self.lite,
            Tier::Standard => &self.standard,
            Tier::Pro => &self.pro,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            medium_threshold: default_medium_threshold(),
            top_threshold: default_top_threshold(),
            token_threshold: default_token_threshold(),
            weight_hard: default_weight_hard(),
            weight_medium: default_weight_medium(),
            weight_small: default_weight_small(),
            lite: default_lite_tier(),
            standard: default_standard_tier(),
            pro: default_pro_tier(),
        }
    }
}

fn default_policy() -> RoutingPolicy {
    RoutingPolicy::TwoTier
}

fn default_medium_threshold() -> u32 {
    7
}

fn default_top_threshold() -> u32 {
    10
}

fn default_token_threshold() -> u64 {
    3000
}

fn default_weight_hard() -> u32 {
    5
}

fn default_weight_medium() -> u32 {
    3
}

fn default_weight_small() -> u32 {
    2
}

/// Model binding and sampling parameters for one tier.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TierConfig {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

fn default_lite_tier() -> TierConfig {
    TierConfig {
        model: default_lite_model(),
        temperature: 1.0,
        top_p: 0.95,
        top_k: 64,
    }
}

fn default_standard_tier() -> TierConfig {
    TierConfig {
        model: "gemini-2.5-flash".to_string(),
        temperature: 0.7,
        top_p: 0.9,
        top_k: 40,
    }
}

fn default_pro_tier() -> TierConfig {
    TierConfig {
        model: "gemini-2.5-pro".to_string(),
        temperature: 0.2,
        top_p: 0.8,
        top_k: 20,
    }
}

/// Conversation store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationConfig {
    /// Number of most recent messages sent as context.
    #[serde(default = "default_max_chat_history")]
    pub max_chat_history: usize,

    /// Messages after which a conversation is frozen.
    #[serde(default = "default_max_total_messages")]
    pub max_total_messages: usize,

    /// Maximum words kept from a generated title.
    #[serde(default = "default_title_max_words")]
    pub title_max_words: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_chat_history: default_max_chat_history(),
            max_total_messages: default_max_total_messages(),
            title_max_words: default_title_max_words(),
        }
    }
}

fn default_max_chat_history() -> usize {
    20
}

fn default_max_total_messages() -> usize {
    100
}

fn default_title_max_words() -> usize {
    5
}

/// Request pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OrchestratorConfig {
    /// Wall-clock budget for one chat turn, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Model used for the one-off title call.
    #[serde(default = "default_lite_model")]
    pub title_model: String,

    /// System instruction sent with every generation call.
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            title_model: default_lite_model(),
            system_instruction: default_system_instruction(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    25
}

fn default_system_instruction() -> String {
    "You are a helpful assistant. Use Google Search if needed to ground your answers \
     and cite sources with [number] where relevant. Use Code execution tool only for \
     code-related queries and complex math, do not show internal tool in response if \
     it being used"
        .to_string()
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind to.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind to.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8001
}

/// Routing overrides for the interactive shell.
///
/// The shell defaults to three tiers with a lower standard threshold than the
/// HTTP gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    #[serde(default = "default_shell_policy")]
    pub policy: RoutingPolicy,

    #[serde(default = "default_shell_medium_threshold")]
    pub medium_threshold: u32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            policy: default_shell_policy(),
            medium_threshold: default_shell_medium_threshold(),
        }
    }
}

impl ShellConfig {
    /// The gateway routing config with the shell's overrides applied.
    pub fn apply(&self, routing: &RoutingConfig) -> RoutingConfig {
        RoutingConfig {
            policy: self.policy,
            medium_threshold: self.medium_threshold,
            ..routing.clone()
        }
    }
}

fn default_shell_policy() -> RoutingPolicy {
    RoutingPolicy::ThreeTier
}

fn default_shell_medium_threshold() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_limits() {
        let config = TierchatConfig::default();
        assert_eq!(config.routing.policy, RoutingPolicy::TwoTier);
        assert_eq!(config.routing.medium_threshold, 7);
        assert_eq!(config.routing.top_threshold, 10);
        assert_eq!(config.routing.token_threshold, 3000);
        assert_eq!(config.conversation.max_chat_history, 20);
        assert_eq!(config.conversation.max_total_messages, 100);
        assert_eq!(config.orchestrator.timeout_secs, 25);
        assert_eq!(config.orchestrator.title_model, "gemini-2.5-flash-lite");
    }

    #[test]
    fn tier_bindings_resolve_by_tier() {
        let routing = RoutingConfig::default();
        assert_eq!(routing.tier(Tier::Lite).model, "gemini-2.5-flash-lite");
        assert_eq!(routing.tier(Tier::Standard).model, "gemini-2.5-flash");
        assert_eq!(routing.tier(Tier::Pro).model, "gemini-2.5-pro");
        assert_eq!(routing.tier(Tier::Pro).top_k, 20);
    }

    #[test]
    fn shell_overrides_policy_and_threshold_only() {
        let routing = RoutingConfig::default();
        let shell = ShellConfig::default().apply(&routing);
        assert_eq!(shell.policy, RoutingPolicy::ThreeTier);
        assert_eq!(shell.medium_threshold, 5);
        assert_eq!(shell.top_threshold, routing.top_threshold);
        assert_eq!(shell.standard, routing.standard);
    }

    #[test]
    fn debug_output_hides_api_key() {
        let gemini = GeminiConfig {
            api_key: Some("AIza-secret".to_string()),
            ..GeminiConfig::default()
        };
        let rendered = format!("{gemini:?}");
        assert!(!rendered.contains("AIza-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn redacted_copy_replaces_key() {
        let mut config = TierchatConfig::default();
        config.gemini.api_key = Some("AIza-secret".to_string());
        assert_eq!(
            config.redacted().gemini.api_key.as_deref(),
            Some("[REDACTED]")
        );
        assert_eq!(config.gemini.api_key.as_deref(), Some("AIza-secret"));
    }

    #[test]
    fn partial_tier_table_is_rejected() {
        let toml_str = r#"
[routing.pro]
model = "gemini-2.5-pro"
"#;
        assert!(toml::from_str::<TierchatConfig>(toml_str).is_err());
    }
}
