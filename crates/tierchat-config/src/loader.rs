// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tierchat.toml` > `~/.config/tierchat/tierchat.toml` >
//! `/etc/tierchat/tierchat.toml` with environment variable overrides via the
//! `TIERCHAT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TierchatConfig;

/// Config sections that `TIERCHAT_<SECTION>_<KEY>` variables map onto.
const ENV_SECTIONS: &[&str] = &[
    "agent",
    "gemini",
    "routing",
    "conversation",
    "orchestrator",
    "gateway",
    "shell",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tierchat/tierchat.toml` (system-wide)
/// 3. `~/.config/tierchat/tierchat.toml` (user XDG config)
/// 4. `./tierchat.toml` (local directory)
/// 5. `GEMINI_API_KEY`
/// 6. `TIERCHAT_*` environment variables
pub fn load_config() -> Result<TierchatConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TierchatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TierchatConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TierchatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TierchatConfig::default()))
        .merge(Toml::file(path))
        .merge(api_key_fallback())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TierchatConfig::default()))
        .merge(Toml::file("/etc/tierchat/tierchat.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tierchat/tierchat.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tierchat.toml"))
        .merge(api_key_fallback())
        .merge(env_provider())
}

/// The conventional `GEMINI_API_KEY` variable, mapped onto `gemini.api_key`.
fn api_key_fallback() -> Env {
    Env::raw()
        .only(&["GEMINI_API_KEY"])
        .map(|_| "gemini.api_key".into())
}

/// Create the environment variable provider with an explicit section mapping.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `TIERCHAT_GEMINI_API_KEY` maps to `gemini.api_key`, not `gemini.api.key`.
fn env_provider() -> Env {
    Env::prefixed("TIERCHAT_").map(|key| {
        let key_str = key.as_str();
        for section in ENV_SECTIONS {
            if let Some(rest) = key_str
                .strip_prefix(section)
                .and_then(|r| r.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.to_string().into()
    })
}
