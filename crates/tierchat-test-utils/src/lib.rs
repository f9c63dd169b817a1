// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tierchat integration tests.
//!
//! - [`MockGenerator`]: scripted generation adapter that records every call
//! - [`test_config`]: defaults with a short orchestrator timeout

pub mod mock_generator;

pub use mock_generator::MockGenerator;

use tierchat_config::TierchatConfig;

/// Shipped defaults with a dummy API key and a two-second turn timeout.
pub fn test_config() -> TierchatConfig {
    let mut config = TierchatConfig::default();
    config.gemini.api_key = Some("test-key".to_string());
    config.orchestrator.timeout_secs = 2;
    config
}
