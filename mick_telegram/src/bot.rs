use crate::{Command, Error, Result};
use mick_config::{Config, DeploymentMode};
use mick_conversation::{ConversationHandler, HistoryStore};
use mick_providers::OpenAiProvider;
use std::{sync::Arc, time::Duration};
use teloxide::prelude::*;
use tokio::time::sleep;
use tracing::{info, warn};

/// Telegram Bot relaying chats to a completion provider
#[derive(Clone)]
pub struct TelegramBot {
    /// Teloxide bot instance
    pub bot: Bot,
    /// Conversation handler shared by every update
    pub handler: Arc<ConversationHandler<OpenAiProvider>>,
    /// How updates are received
    mode: DeploymentMode,
    /// Our @username, known once connected
    username: Option<Arc<str>>,
}

impl TelegramBot {
    /// Create a new Telegram bot
    pub fn new(token: String, provider: OpenAiProvider, config: &Config) -> Result<Self> {
        let mode = config
            .deployment_mode()
            .map_err(|e| Error::Config(e.to_string()))?;

        let store = Arc::new(HistoryStore::new(
            config.agents.defaults.system_prompt.clone(),
        ));
        let handler = ConversationHandler::new(provider, store, config.completion_config());

        Ok(Self {
            bot: Bot::new(token),
            handler: Arc::new(handler),
            mode,
            username: None,
        })
    }

    #[must_use]
    pub const fn mode(&self) -> &DeploymentMode {
        &self.mode
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Test connection to Telegram API with linear backoff retry.
    /// Starts at 2s, increases by 2s each attempt, max 10s delay.
    /// Retries indefinitely until connection succeeds.
    async fn test_connection(&self) -> Result<Option<String>> {
        const INITIAL_DELAY_SECS: u64 = 2;
        const MAX_DELAY_SECS: u64 = 10;

        let mut attempt = 1u64;
        loop {
            match self.bot.get_me().await {
                Ok(me) => {
                    info!(
                        "Connected to Telegram API: @{} (id: {})",
                        me.user.username.as_deref().unwrap_or("no username"),
                        me.user.id
                    );
                    return Ok(me.user.username.clone());
                }
                Err(e) => {
                    let delay_secs = (INITIAL_DELAY_SECS * attempt).min(MAX_DELAY_SECS);

                    warn!("Connection attempt {attempt} failed: {e}. Retrying in {delay_secs}s...");

                    // Only show detailed help on first failure
                    if attempt == 1 {
                        warn!("This may be due to:");
                        warn!("  - Network connectivity issues");
                        warn!("  - Firewall blocking api.telegram.org");
                        warn!("  - Invalid bot token");
                        warn!("  - Telegram API being temporarily unavailable");
                    }

                    sleep(Duration::from_secs(delay_secs)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Run the bot until Ctrl+C
    pub async fn run(mut self) -> Result<()> {
        use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
        use teloxide::dptree;
        use teloxide::error_handlers::LoggingErrorHandler;
        use teloxide::types::Update;
        use teloxide::update_listeners::{Polling, webhooks};

        self.username = self.test_connection().await?.map(Arc::from);

        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!("Failed to register bot commands: {e}");
        }

        let bot = self.bot.clone();
        let mode = self.mode.clone();

        let schema = dptree::entry().branch(Update::filter_message().endpoint({
            let bot_clone = self.clone();
            move |msg: Message| {
                let bot_clone = bot_clone.clone();
                async move { crate::handler::handle_message(bot_clone, msg).await }
            }
        }));

        let mut dispatcher = Dispatcher::builder(bot.clone(), schema)
            .enable_ctrlc_handler()
            .build();

        match mode {
            DeploymentMode::Polling => {
                info!("Starting polling mode...");
                let listener = Polling::builder(bot).drop_pending_updates().build();
                dispatcher
                    .dispatch_with_listener(
                        listener,
                        LoggingErrorHandler::with_custom_text("An error from the update listener"),
                    )
                    .await;
            }
            DeploymentMode::Webhook { listen, url } => {
                info!("Starting webhook mode on {url} (listening on {listen})");
                let options =
                    webhooks::Options::new(listen, url.parse::<url::Url>()?).drop_pending_updates();
                let listener = webhooks::axum(bot, options).await?;
                dispatcher
                    .dispatch_with_listener(
                        listener,
                        LoggingErrorHandler::with_custom_text("An error from the update listener"),
                    )
                    .await;
            }
        }

        Ok(())
    }
}
