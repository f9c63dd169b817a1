// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-lifetime conversation store.
//!
//! Each key owns an entry with two locks: a turn gate that serializes whole
//! request turns, and a read/write lock around the messages and title so
//! readers always see a consistent copy. Keys never block each other.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use tierchat_core::types::{
    AdapterType, ChatSummary, ConversationSnapshot, HealthStatus,
};
use tierchat_core::{
    ConversationKey, ConversationStore, Message, PluginAdapter, TierchatError, TurnPermit,
};

#[derive(Debug, Default)]
struct Conversation {
    messages: Vec<Message>,
    title: Option<String>,
}

#[derive(Debug)]
struct Entry {
    turn_gate: Arc<Mutex<()>>,
    created_seq: u64,
    state: RwLock<Conversation>,
}

/// In-memory [`ConversationStore`] backed by a concurrent map.
#[derive(Debug)]
pub struct InMemoryStore {
    entries: DashMap<ConversationKey, Arc<Entry>>,
    capacity: usize,
    next_seq: AtomicU64,
}

impl InMemoryStore {
    /// Create a store whose conversations freeze at `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            next_seq: AtomicU64::new(0),
        }
    }

    /// Number of conversations currently held.
    pub fn conversation_count(&self) -> usize {
        self.entries.len()
    }

    fn entry_or_create(&self, key: &ConversationKey) -> Arc<Entry> {
        // Clone the Arc out so no map shard lock is held across an await.
        self.entries
            .entry(key.clone())
            .or_insert_with(|| {
                debug!(key = %key, "creating conversation");
                Arc::new(Entry {
                    turn_gate: Arc::new(Mutex::new(())),
                    created_seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                    state: RwLock::new(Conversation::default()),
                })
            })
            .clone()
    }

    fn existing(&self, key: &ConversationKey) -> Result<Arc<Entry>, TierchatError> {
        self.entries
            .get(key)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| not_found(key))
    }
}

fn not_found(key: &ConversationKey) -> TierchatError {
    TierchatError::NotFound {
        user_id: key.user_id.clone(),
        chat_id: key.chat_id.clone(),
    }
}

#[async_trait]
impl PluginAdapter for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, TierchatError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    fn capacity(&self) -> usize {
        self.capacity
    }

    async fn get_or_create(&self, key: &ConversationKey) -> Result<usize, TierchatError> {
        let entry = self.entry_or_create(key);
        let len = entry.state.read().await.messages.len();
        Ok(len)
    }

    async fn append(&self, key: &ConversationKey, message: Message) -> Result<(), TierchatError> {
        let entry = self.existing(key)?;
        let mut state = entry.state.write().await;
        if state.messages.len() >= self.capacity {
            return Err(TierchatError::ConversationFull {
                limit: self.capacity,
            });
        }
        state.messages.push(message);
        Ok(())
    }

    async fn recent_window(
        &self,
        key: &ConversationKey,
        n: usize,
    ) -> Result<Vec<Message>, TierchatError> {
        let entry = self.existing(key)?;
        let state = entry.state.read().await;
        let start = state.messages.len().saturating_sub(n);
        Ok(state.messages[start..].to_vec())
    }

    async fn assign_title_once(
        &self,
        key: &ConversationKey,
        title: &str,
    ) -> Result<bool, TierchatError> {
        let entry = self.existing(key)?;
        let mut state = entry.state.write().await;
        if state.title.is_some() || !state.messages.is_empty() {
            return Ok(false);
        }
        state.title = Some(title.to_string());
        Ok(true)
    }

    async fn delete(&self, key: &ConversationKey) -> Result<(), TierchatError> {
        match self.entries.remove(key) {
            Some(_) => {
                debug!(key = %key, "deleted conversation");
                Ok(())
            }
            None => Err(not_found(key)),
        }
    }

    async fn snapshot(
        &self,
        key: &ConversationKey,
    ) -> Result<Option<ConversationSnapshot>, TierchatError> {
        let Some(entry) = self.entries.get(key).map(|e| Arc::clone(e.value())) else {
            return Ok(None);
        };
        let state = entry.state.read().await;
        Ok(Some(ConversationSnapshot {
            title: state.title.clone(),
            messages: state.messages.clone(),
        }))
    }

    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatSummary>, TierchatError> {
        let mut owned: Vec<(String, Arc<Entry>)> = self
            .entries
            .iter()
            .filter(|e| e.key().user_id == user_id)
            .map(|e| (e.key().chat_id.clone(), Arc::clone(e.value())))
            .collect();
        owned.sort_by_key(|(_, entry)| entry.created_seq);

        let mut chats = Vec::with_capacity(owned.len());
        for (chat_id, entry) in owned {
            let title = entry.state.read().await.title.clone();
            chats.push(ChatSummary { chat_id, title });
        }
        Ok(chats)
    }

    async fn begin_turn(&self, key: &ConversationKey) -> Result<TurnPermit, TierchatError> {
        let entry = self.entry_or_create(key);
        Ok(Arc::clone(&entry.turn_gate).lock_owned().await)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn key(user: &str, chat: &str) -> ConversationKey {
        ConversationKey::new(user, chat)
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let store = InMemoryStore::new(100);
        let k = key("u1", "c1");
        assert_eq!(store.get_or_create(&k).await.unwrap(), 0);
        store.append(&k, Message::user("hi")).await.unwrap();
        assert_eq!(store.get_or_create(&k).await.unwrap(), 1);
        assert_eq!(store.conversation_count(), 1);
    }

    #[tokio::test]
    async fn append_to_unknown_key_is_not_found() {
        let store = InMemoryStore::new(100);
        let err = store
            .append(&key("u1", "nope"), Message::user("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, TierchatError::NotFound { .. }));
    }

    #[tokio::test]
    async fn append_stops_at_capacity() {
        let store = InMemoryStore::new(3);
        let k = key("u1", "c1");
        store.get_or_create(&k).await.unwrap();
        for i in 0..3 {
            store.append(&k, Message::user(format!("m{i}"))).await.unwrap();
        }
        let err = store.append(&k, Message::user("m3")).await.unwrap_err();
        assert!(matches!(err, TierchatError::ConversationFull { limit: 3 }));
        assert_eq!(store.get_or_create(&k).await.unwrap(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_never_exceed_capacity() {
        let store = Arc::new(InMemoryStore::new(5));
        let k = key("u1", "c1");
        store.get_or_create(&k).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            let k = k.clone();
            handles.push(tokio::spawn(async move {
                store.append(&k, Message::user(format!("m{i}"))).await.is_ok()
            }));
        }
        let mut ok = 0;
        for h in handles {
            if h.await.unwrap() {
                ok += 1;
            }
        }
        assert_eq!(ok, 5);
        assert_eq!(store.get_or_create(&k).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn recent_window_returns_tail_in_order() {
        let store = InMemoryStore::new(100);
        let k = key("u1", "c1");
        store.get_or_create(&k).await.unwrap();
        for i in 0..5 {
            store.append(&k, Message::user(format!("m{i}"))).await.unwrap();
        }
        let window = store.recent_window(&k, 2).await.unwrap();
        assert_eq!(window, vec![Message::user("m3"), Message::user("m4")]);
        let all = store.recent_window(&k, 50).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn title_is_assigned_once_and_only_while_empty() {
        let store = InMemoryStore::new(100);
        let k = key("u1", "c1");
        store.get_or_create(&k).await.unwrap();
        assert!(store.assign_title_once(&k, "First").await.unwrap());
        assert!(!store.assign_title_once(&k, "Second").await.unwrap());

        let other = key("u1", "c2");
        store.get_or_create(&other).await.unwrap();
        store.append(&other, Message::user("hi")).await.unwrap();
        assert!(!store.assign_title_once(&other, "Late").await.unwrap());

        let snap = store.snapshot(&k).await.unwrap().unwrap();
        assert_eq!(snap.title.as_deref(), Some("First"));
    }

    #[tokio::test]
    async fn delete_removes_messages_and_title() {
        let store = InMemoryStore::new(100);
        let k = key("u1", "c1");
        store.get_or_create(&k).await.unwrap();
        store.assign_title_once(&k, "Title").await.unwrap();
        store.append(&k, Message::user("hi")).await.unwrap();

        store.delete(&k).await.unwrap();
        assert!(store.snapshot(&k).await.unwrap().is_none());

        // Recreated conversations start clean.
        assert_eq!(store.get_or_create(&k).await.unwrap(), 0);
        let snap = store.snapshot(&k).await.unwrap().unwrap();
        assert!(snap.title.is_none());
    }

    #[tokio::test]
    async fn delete_unknown_key_leaves_store_unchanged() {
        let store = InMemoryStore::new(100);
        store.get_or_create(&key("u1", "c1")).await.unwrap();
        let err = store.delete(&key("u1", "missing")).await.unwrap_err();
        assert!(matches!(err, TierchatError::NotFound { ref chat_id, .. } if chat_id == "missing"));
        assert_eq!(store.conversation_count(), 1);
    }

    #[tokio::test]
    async fn list_chats_filters_by_user_in_creation_order() {
        let store = InMemoryStore::new(100);
        for chat in ["b", "a", "c"] {
            store.get_or_create(&key("u1", chat)).await.unwrap();
        }
        store.get_or_create(&key("u2", "z")).await.unwrap();
        store.assign_title_once(&key("u1", "a"), "Titled").await.unwrap();

        let chats = store.list_chats("u1").await.unwrap();
        let ids: Vec<_> = chats.iter().map(|c| c.chat_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(chats[1].title.as_deref(), Some("Titled"));
        assert!(store.list_chats("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn turn_permit_serializes_same_key_only() {
        let store = InMemoryStore::new(100);
        let held = store.begin_turn(&key("u1", "c1")).await.unwrap();

        let same = tokio::time::timeout(
            Duration::from_millis(50),
            store.begin_turn(&key("u1", "c1")),
        )
        .await;
        assert!(same.is_err(), "second turn on the same key must wait");

        let other = tokio::time::timeout(
            Duration::from_millis(50),
            store.begin_turn(&key("u1", "c2")),
        )
        .await;
        assert!(other.is_ok(), "other keys must not wait");

        drop(held);
        let again = tokio::time::timeout(
            Duration::from_millis(50),
            store.begin_turn(&key("u1", "c1")),
        )
        .await;
        assert!(again.is_ok());
    }
}
