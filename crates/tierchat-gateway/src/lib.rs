// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface for the Tierchat gateway.
//!
//! Exposes the chat turn endpoint plus read and delete access to stored
//! conversations. All state lives behind the [`tierchat_agent::Orchestrator`].

pub mod handlers;
pub mod server;

pub use server::{AppState, router, start_server};
