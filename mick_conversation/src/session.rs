//! The transcript of one user's conversation.

use chrono::{DateTime, Utc};

use mick_core::{ChatMessage, Role};

/// Ordered turns exchanged with one user.
///
/// A fresh history holds exactly one `system` turn. Turns are only ever
/// appended; nothing trims the transcript short of [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    /// Telegram user id owning this history
    pub user_id: u64,
    messages: Vec<ChatMessage>,
    /// Creation (or last reset) timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ConversationHistory {
    #[must_use]
    pub fn new(user_id: u64, system_prompt: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            messages: vec![ChatMessage::system(system_prompt)],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn add_message(&mut self, role: Role, content: String) {
        self.messages.push(ChatMessage { role, content });
        self.updated_at = Utc::now();
    }

    /// All turns, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Number of completed user/assistant exchanges.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count()
    }

    /// Total characters across all turns; what the next request will carry.
    #[must_use]
    pub fn total_chars(&self) -> usize {
        self.messages.iter().map(|m| m.content.chars().count()).sum()
    }

    /// Discard everything and start over from a single `system` turn.
    pub fn reset(&mut self, system_prompt: &str) {
        let now = Utc::now();
        self.messages.clear();
        self.messages.push(ChatMessage::system(system_prompt));
        self.created_at = now;
        self.updated_at = now;
    }
}
