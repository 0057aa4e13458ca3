//! Relay between one chat user and the completion backend.
//!
//! `ConversationHandler` is the entry point for inbound messages: it keeps
//! the user's history in the [`HistoryStore`], calls the provider and sends
//! the reply (or the failure) back through a [`ReplySink`].

use mick_core::{
    CompletionConfig, LLMProvider, MAX_MESSAGE_CHARS, Role, split_message, truncate_chars,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::history::HistoryStore;
use crate::sink::ReplySink;

/// Prepended to the description of a failed completion.
pub const ERROR_PREFIX: &str = "🚫 Error: ";

/// Sent in place of an empty completion reply, which Telegram would reject.
pub const EMPTY_REPLY_MESSAGE: &str = "🚫 Error: Message text is empty";

/// Sent after `/reset`.
pub const RESET_MESSAGE: &str = "♻️ Conversation history cleared!";

pub const HELP_TEXT: &str = r"
🤖 Mick Your AI

Commands:
/start - Say hello
/reset - Clear conversation history
/help  - Show this help

Just send a message to start chatting!
";

#[must_use]
pub fn welcome_text(display_name: &str) -> String {
    format!("Hello {display_name}! I'm Mick Your AI. Ask me anything!")
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The reply was stored and delivered in `chunks` messages.
    Replied { chunks: usize },
    /// The completion call failed; the user was told `error`.
    Failed { error: String },
}

/// Bridges inbound user messages to completion calls.
///
/// Holds no conversation state of its own: every exchange goes through the
/// shared [`HistoryStore`].
pub struct ConversationHandler<P = Arc<dyn LLMProvider>>
where
    P: Send + Sync,
{
    provider: P,
    store: Arc<HistoryStore>,
    config: CompletionConfig,
}

impl<P> ConversationHandler<P>
where
    P: LLMProvider + Send + Sync,
{
    pub fn new(provider: P, store: Arc<HistoryStore>, config: CompletionConfig) -> Self {
        info!(
            "Creating conversation handler: model={}, max_tokens={}, temperature={}",
            config.model, config.max_tokens, config.temperature
        );
        Self {
            provider,
            store,
            config,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    /// Process one text message from `user_id`.
    ///
    /// The user turn is committed before the completion call and stays there
    /// even if the call fails. The user's history is locked from the first
    /// append until the assistant turn is stored.
    ///
    /// Only delivery failures are returned as errors.
    pub async fn handle<S>(
        &self,
        user_id: u64,
        text: &str,
        sink: &S,
    ) -> Result<HandleOutcome, S::Error>
    where
        S: ReplySink + ?Sized,
    {
        let history = self.store.get_or_create(user_id).await;
        let mut history = history.lock().await;

        history.add_message(Role::User, text.to_string());
        debug!(
            "User {user_id}: {} turns, {} chars of context",
            history.message_count(),
            history.total_chars()
        );

        if let Err(e) = sink.typing().await {
            debug!("Failed to send typing action: {e}");
        }

        let result = self.provider.chat(history.messages(), &self.config).await;
        match result {
            Ok(response) => {
                let reply = response.content;
                history.add_message(Role::Assistant, reply.clone());
                drop(history);

                let mut chunks = split_message(&reply, MAX_MESSAGE_CHARS);
                if chunks.is_empty() {
                    warn!("Empty completion reply for user {user_id}");
                    chunks.push(EMPTY_REPLY_MESSAGE);
                }
                if chunks.len() > 1 {
                    info!(
                        "Reply for user {user_id} is {} chars, sending {} messages",
                        reply.chars().count(),
                        chunks.len()
                    );
                }
                for chunk in &chunks {
                    sink.send_text(chunk).await?;
                }

                Ok(HandleOutcome::Replied {
                    chunks: chunks.len(),
                })
            }
            Err(e) => {
                drop(history);
                warn!("Completion failed for user {user_id}: {e}");

                let message = format!("{ERROR_PREFIX}{e}");
                sink.send_text(truncate_chars(&message, MAX_MESSAGE_CHARS))
                    .await?;

                Ok(HandleOutcome::Failed {
                    error: e.to_string(),
                })
            }
        }
    }

    /// Clear `user_id`'s history and acknowledge.
    pub async fn reset<S>(&self, user_id: u64, sink: &S) -> Result<(), S::Error>
    where
        S: ReplySink + ?Sized,
    {
        self.store.reset(user_id).await;
        sink.send_text(RESET_MESSAGE).await
    }

    /// Send the welcome message. History is left alone.
    pub async fn greet<S>(&self, display_name: &str, sink: &S) -> Result<(), S::Error>
    where
        S: ReplySink + ?Sized,
    {
        sink.send_text(&welcome_text(display_name)).await
    }

    pub async fn help<S>(&self, sink: &S) -> Result<(), S::Error>
    where
        S: ReplySink + ?Sized,
    {
        sink.send_text(HELP_TEXT).await
    }
}
