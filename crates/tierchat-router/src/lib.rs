// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Complexity scoring and tier routing for Tierchat.
//!
//! This crate provides:
//! - [`ComplexityClassifier`]: keyword and punctuation scoring (no model call)
//! - [`TierSelector`]: two-tier and three-tier selection policies
//! - [`estimate_tokens`]: best-effort token counting with a length fallback

pub mod classifier;
pub mod router;
pub mod tokens;

pub use classifier::{ComplexityClassifier, ScoreBreakdown, ScoreWeights};
pub use router::{RoutingDecision, TierSelector};
pub use tokens::{TokenEstimate, approximate_tokens, estimate_tokens};
