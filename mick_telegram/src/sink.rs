use async_trait::async_trait;
use mick_conversation::ReplySink;
use teloxide::{
    prelude::*,
    types::{ChatAction, ChatId},
};

/// Sends conversation output back to the chat a message came from.
#[derive(Clone)]
pub struct TelegramReplier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramReplier {
    #[must_use]
    pub const fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl ReplySink for TelegramReplier {
    type Error = teloxide::RequestError;

    async fn send_text(&self, text: &str) -> Result<(), Self::Error> {
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }

    async fn typing(&self) -> Result<(), Self::Error> {
        self.bot
            .send_chat_action(self.chat_id, ChatAction::Typing)
            .await?;
        Ok(())
    }
}
