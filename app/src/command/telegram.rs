use crate::command::CommandStrategy;
use mick_config::{Config, DeploymentMode};
use mick_telegram::TelegramBot;
use tracing::info;

/// Input for the `run` command.
pub struct TelegramInput {
    /// Optional bot token (overrides config and environment)
    pub token: Option<String>,
    /// Optional model (overrides config)
    pub model: Option<String>,
}

/// Strategy for running the Telegram bot.
pub struct TelegramStrategy;

impl CommandStrategy for TelegramStrategy {
    type Input = TelegramInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        if let Some(model) = input.model {
            config.agents.defaults.model = model;
        }

        let token = if let Some(t) = input.token {
            t
        } else if !config.telegram.token.is_empty() {
            config.telegram.token.clone()
        } else {
            anyhow::bail!(
                "Telegram bot token not configured. Set TELEGRAM_TOKEN or \"telegram.token\" in config"
            );
        };

        info!("Starting Telegram bot...");

        let provider = super::build_provider(&config)?;
        let bot = TelegramBot::new(token, provider, &config)?;

        match bot.mode() {
            DeploymentMode::Polling => info!("Updates via long polling"),
            DeploymentMode::Webhook { url, .. } => info!("Updates via webhook at {url}"),
        }

        info!("Telegram bot is running. Press Ctrl+C to stop.");
        bot.run().await?;

        Ok(())
    }
}
