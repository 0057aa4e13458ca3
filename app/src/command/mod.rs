//! Static strategy pattern for CLI commands.
//!
//! Each subcommand is a separate strategy type with its own input, so
//! dispatch is resolved at compile time.

use mick_config::Config;
use mick_providers::OpenAiProvider;
use std::time::Duration;
use tracing::info;

mod info;
mod init;
mod telegram;
mod version;

pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use telegram::{TelegramInput, TelegramStrategy};
pub use version::VersionStrategy;

/// Build the completion provider described by `config`.
fn build_provider(config: &Config) -> anyhow::Result<OpenAiProvider> {
    let openai = &config.providers.openai;
    if openai.api_key.is_empty() {
        anyhow::bail!(
            "OpenAI API key not configured. Set OPENAI_API_KEY or \"providers.openai.api_key\" in config"
        );
    }

    let mut provider = OpenAiProvider::new(openai.api_key.clone())
        .with_timeout(Duration::from_secs(openai.timeout_secs));
    if let Some(base_url) = &openai.base_url {
        info!("Using completion endpoint {base_url}");
        provider = provider.with_base_url(base_url.clone());
    }
    Ok(provider)
}

/// Core trait defining the contract for all command strategies.
///
/// # Example
/// ```rust,ignore
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         // Command logic here
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
