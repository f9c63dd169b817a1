// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that serde attributes cannot express, such
//! as threshold ordering and sampling parameter ranges.

use tierchat_core::Tier;

use crate::diagnostic::ConfigError;
use crate::model::{RoutingPolicy, TierchatConfig};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or every collected error (does
/// not fail fast).
pub fn validate_config(config: &TierchatConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let routing = &config.routing;
    if routing.medium_threshold < 1 {
        fail("routing.medium_threshold must be at least 1".to_string());
    }
    if routing.policy == RoutingPolicy::ThreeTier
        && routing.top_threshold < routing.medium_threshold
    {
        fail(format!(
            "routing.top_threshold ({}) must not be below routing.medium_threshold ({})",
            routing.top_threshold, routing.medium_threshold
        ));
    }
    if config.shell.medium_threshold > routing.top_threshold {
        fail(format!(
            "shell.medium_threshold ({}) must not exceed routing.top_threshold ({})",
            config.shell.medium_threshold, routing.top_threshold
        ));
    }

    for tier in [Tier::Lite, Tier::Standard, Tier::Pro] {
        let binding = routing.tier(tier);
        if binding.model.trim().is_empty() {
            fail(format!("routing.{tier}.model must not be empty"));
        }
        if !(0.0..=2.0).contains(&binding.temperature) {
            fail(format!(
                "routing.{tier}.temperature must be within 0.0..=2.0, got {}",
                binding.temperature
            ));
        }
        if !(0.0..=1.0).contains(&binding.top_p) {
            fail(format!(
                "routing.{tier}.top_p must be within 0.0..=1.0, got {}",
                binding.top_p
            ));
        }
        if binding.top_k == 0 {
            fail(format!("routing.{tier}.top_k must be at least 1"));
        }
    }

    let conversation = &config.conversation;
    if conversation.max_total_messages < 2 {
        fail(format!(
            "conversation.max_total_messages must be at least 2, got {}",
            conversation.max_total_messages
        ));
    }
    if conversation.max_chat_history == 0 {
        fail("conversation.max_chat_history must be at least 1".to_string());
    }
    if conversation.title_max_words == 0 {
        fail("conversation.title_max_words must be at least 1".to_string());
    }

    if config.orchestrator.timeout_secs == 0 {
        fail("orchestrator.timeout_secs must be at least 1".to_string());
    }
    if config.orchestrator.title_model.trim().is_empty() {
        fail("orchestrator.title_model must not be empty".to_string());
    }

    if config.gemini.base_url.trim().is_empty() {
        fail("gemini.base_url must not be empty".to_string());
    }
    if config.gemini.request_timeout_secs == 0 {
        fail("gemini.request_timeout_secs must be at least 1".to_string());
    }

    let host = config.gateway.host.trim();
    let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
    let is_valid_hostname = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
    if !is_valid_ip && !is_valid_hostname {
        fail(format!(
            "gateway.host `{host}` is not a valid IP address or hostname"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&TierchatConfig::default()).is_ok());
    }

    #[test]
    fn inverted_three_tier_thresholds_fail() {
        let mut config = TierchatConfig::default();
        config.routing.policy = RoutingPolicy::ThreeTier;
        config.routing.top_threshold = 4;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "routing.top_threshold"));
    }

    #[test]
    fn out_of_range_sampling_parameters_fail() {
        let mut config = TierchatConfig::default();
        config.routing.pro.temperature = 3.5;
        config.routing.lite.top_p = 1.5;
        config.routing.standard.top_k = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "routing.pro.temperature"));
        assert!(has_error(&errors, "routing.lite.top_p"));
        assert!(has_error(&errors, "routing.standard.top_k"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = TierchatConfig::default();
        config.orchestrator.timeout_secs = 0;
        config.conversation.max_total_messages = 1;
        config.gateway.host = "not a host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn hostname_and_ipv6_hosts_pass() {
        let mut config = TierchatConfig::default();
        config.gateway.host = "chat.internal".to_string();
        assert!(validate_config(&config).is_ok());
        config.gateway.host = "::1".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
