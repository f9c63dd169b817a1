// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation storage for Tierchat.
//!
//! [`InMemoryStore`] keeps every conversation for the lifetime of the process.
//! A durable backend only needs another [`tierchat_core::ConversationStore`]
//! implementation.

pub mod memory;

pub use memory::InMemoryStore;
