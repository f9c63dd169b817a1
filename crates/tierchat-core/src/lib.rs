// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tierchat gateway.
//!
//! This crate provides the trait definitions, error types, and common types
//! shared by the router, store, generation client, orchestrator, and HTTP
//! surface.

pub mod error;
pub mod traits;
pub mod types;

pub use error::TierchatError;
pub use types::{
    AdapterType, ConversationKey, HealthStatus, Message, Role, Tier,
};

pub use traits::{ConversationStore, GenerationAdapter, PluginAdapter, TurnPermit};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn tiers_are_ordered_lite_to_pro() {
        assert!(Tier::Lite < Tier::Standard);
        assert!(Tier::Standard < Tier::Pro);
        assert_eq!(Tier::Lite.max(Tier::Pro), Tier::Pro);
    }

    #[test]
    fn tier_display_and_from_str_agree() {
        for tier in [Tier::Lite, Tier::Standard, Tier::Pro] {
            let s = tier.to_string();
            assert_eq!(Tier::from_str(&s).unwrap(), tier);
        }
        assert_eq!(Tier::Standard.to_string(), "standard");
    }

    #[test]
    fn message_serializes_with_lowercase_role() {
        let json = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "hi"}));

        let parsed: Message =
            serde_json::from_str(r#"{"role":"user","content":"What?"}"#).unwrap();
        assert_eq!(parsed, Message::user("What?"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let parsed = serde_json::from_str::<Message>(r#"{"role":"system","content":"x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn finish_reason_parses_stop_only() {
        assert_eq!(types::FinishReason::parse("STOP"), types::FinishReason::Stop);
        assert_eq!(
            types::FinishReason::parse("MAX_TOKENS"),
            types::FinishReason::Other("MAX_TOKENS".into())
        );
    }

    #[test]
    fn error_messages_are_descriptive() {
        let full = TierchatError::ConversationFull { limit: 100 };
        assert_eq!(full.to_string(), "conversation is full (100 messages)");

        let missing = TierchatError::NotFound {
            user_id: "u1".into(),
            chat_id: "c1".into(),
        };
        assert_eq!(missing.to_string(), "conversation not found: u1/c1");

        let provider = TierchatError::provider("boom");
        assert_eq!(provider.to_string(), "provider error: boom");
    }

    #[test]
    fn conversation_key_displays_as_path() {
        assert_eq!(ConversationKey::new("u1", "c1").to_string(), "u1/c1");
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_generation_adapter<T: GenerationAdapter>() {}
        fn _assert_conversation_store<T: ConversationStore>() {}
    }
}
