//! Process-wide store of conversation histories, keyed by user id.

use mick_core::{ChatMessage, DEFAULT_SYSTEM_PROMPT};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::session::ConversationHistory;

/// Handle to one user's history. Hold the lock for the whole exchange.
pub type SharedHistory = Arc<Mutex<ConversationHistory>>;

/// In-memory map from user id to [`ConversationHistory`].
///
/// The map lock is only taken to look up or insert an entry; each entry has
/// its own lock for content changes, so users never wait on each other.
/// Entries live for the life of the process.
#[derive(Debug)]
pub struct HistoryStore {
    system_prompt: String,
    entries: Mutex<HashMap<u64, SharedHistory>>,
}

impl HistoryStore {
    #[must_use]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the history for `user_id`, creating it on first contact.
    pub async fn get_or_create(&self, user_id: u64) -> SharedHistory {
        let mut entries = self.entries.lock().await;
        Arc::clone(entries.entry(user_id).or_insert_with(|| {
            debug!("Creating conversation history for user {user_id}");
            Arc::new(Mutex::new(ConversationHistory::new(
                user_id,
                &self.system_prompt,
            )))
        }))
    }

    /// Put `user_id` back to a single `system` turn.
    ///
    /// Waits for any exchange in flight for this user to finish first.
    pub async fn reset(&self, user_id: u64) {
        let history = self.get_or_create(user_id).await;
        let mut history = history.lock().await;
        debug!(
            "Resetting history for user {}: {} exchanges since {}, last active {}",
            history.user_id,
            history.turn_count(),
            history.created_at,
            history.updated_at
        );
        history.reset(&self.system_prompt);
    }

    /// Copy of the turns stored for `user_id`, if the user has been seen.
    pub async fn snapshot(&self, user_id: u64) -> Option<Vec<ChatMessage>> {
        let history = self.entries.lock().await.get(&user_id).cloned()?;
        let messages = history.lock().await.messages().to_vec();
        Some(messages)
    }

    /// Number of users with a history.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mick_core::Role;

    #[tokio::test]
    async fn new_user_gets_single_system_turn() {
        let store = HistoryStore::default();
        let history = store.get_or_create(42).await;

        let history = history.lock().await;
        assert_eq!(
            history.messages(),
            &[ChatMessage::system("You're a helpful assistant")]
        );
    }

    #[tokio::test]
    async fn same_user_shares_one_entry() {
        let store = HistoryStore::default();
        let first = store.get_or_create(1).await;
        let second = store.get_or_create(1).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn reset_is_idempotent_and_creates_entry() {
        let store = HistoryStore::new("sys");
        store.reset(5).await;
        store.reset(5).await;

        assert_eq!(store.snapshot(5).await, Some(vec![ChatMessage::system("sys")]));
    }

    #[tokio::test]
    async fn reset_discards_prior_turns() {
        let store = HistoryStore::new("sys");
        {
            let history = store.get_or_create(5).await;
            let mut history = history.lock().await;
            history.add_message(Role::User, "hello".to_string());
            history.add_message(Role::Assistant, "hi".to_string());
        }

        store.reset(5).await;
        assert_eq!(store.snapshot(5).await, Some(vec![ChatMessage::system("sys")]));
    }

    #[tokio::test]
    async fn unknown_user_has_no_snapshot() {
        let store = HistoryStore::default();
        assert!(store.snapshot(99).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_first_contact_creates_one_entry() {
        let store = Arc::new(HistoryStore::default());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.get_or_create(3).await })
            })
            .collect();

        let mut entries = Vec::new();
        for handle in handles {
            if let Ok(entry) = handle.await {
                entries.push(entry);
            }
        }

        assert_eq!(entries.len(), 16);
        assert!(entries.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(store.len().await, 1);
    }
}
