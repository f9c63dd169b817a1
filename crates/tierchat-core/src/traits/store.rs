// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation store trait for bounded per-conversation history.

use async_trait::async_trait;

use crate::error::TierchatError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatSummary, ConversationKey, ConversationSnapshot, Message};

/// Exclusive right to run one request turn against a conversation.
///
/// Held for the whole turn; dropping it lets the next turn for the same key
/// proceed. Turns for different keys never contend.
pub type TurnPermit = tokio::sync::OwnedMutexGuard<()>;

/// Storage for conversations keyed by `(user_id, chat_id)`.
///
/// Every operation is atomic per key. A conversation never holds more than
/// [`ConversationStore::capacity`] messages.
#[async_trait]
pub trait ConversationStore: PluginAdapter {
    /// Maximum number of messages one conversation may hold.
    fn capacity(&self) -> usize;

    /// Returns the current message count, creating an empty conversation if
    /// none exists for `key`.
    async fn get_or_create(&self, key: &ConversationKey) -> Result<usize, TierchatError>;

    /// Appends a message.
    ///
    /// Fails with [`TierchatError::ConversationFull`] once the cap is reached
    /// and [`TierchatError::NotFound`] if the conversation does not exist.
    async fn append(&self, key: &ConversationKey, message: Message) -> Result<(), TierchatError>;

    /// Returns up to the last `n` messages in chronological order.
    async fn recent_window(
        &self,
        key: &ConversationKey,
        n: usize,
    ) -> Result<Vec<Message>, TierchatError>;

    /// Sets the title if the conversation exists, is empty and has no title.
    ///
    /// Returns whether the title was written.
    async fn assign_title_once(
        &self,
        key: &ConversationKey,
        title: &str,
    ) -> Result<bool, TierchatError>;

    /// Removes the conversation and its title together.
    async fn delete(&self, key: &ConversationKey) -> Result<(), TierchatError>;

    /// Returns a consistent copy of the conversation, if it exists.
    async fn snapshot(
        &self,
        key: &ConversationKey,
    ) -> Result<Option<ConversationSnapshot>, TierchatError>;

    /// Lists a user's conversations in creation order.
    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatSummary>, TierchatError>;

    /// Waits for the per-key turn permit, creating the conversation if needed.
    async fn begin_turn(&self, key: &ConversationKey) -> Result<TurnPermit, TierchatError>;
}
