// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Tierchat gateway.
//!
//! Both adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod generation;
pub mod store;

pub use adapter::PluginAdapter;
pub use generation::GenerationAdapter;
pub use store::{ConversationStore, TurnPermit};
