use mick_core::{CompletionConfig, DEFAULT_SYSTEM_PROMPT};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tracing::info;

const WEBHOOK_PATH: &str = "/webhook";

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "ProviderConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    const fn default_timeout_secs() -> u64 {
        120
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct AgentsConfig {
    #[serde(default)]
    pub defaults: AgentDefaults,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentDefaults {
    #[serde(default = "AgentDefaults::default_model")]
    pub model: String,
    #[serde(default = "AgentDefaults::default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "AgentDefaults::default_temperature")]
    pub temperature: f32,
    #[serde(default = "AgentDefaults::default_system_prompt")]
    pub system_prompt: String,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            max_tokens: Self::default_max_tokens(),
            temperature: Self::default_temperature(),
            system_prompt: Self::default_system_prompt(),
        }
    }
}

impl AgentDefaults {
    fn default_model() -> String {
        CompletionConfig::default().model
    }

    fn default_max_tokens() -> u32 {
        CompletionConfig::default().max_tokens
    }

    fn default_temperature() -> f32 {
        CompletionConfig::default().temperature
    }

    fn default_system_prompt() -> String {
        DEFAULT_SYSTEM_PROMPT.to_string()
    }
}

/// Webhook delivery settings. Long polling is used unless `enabled`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebhookConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "WebhookConfig::default_port")]
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: Self::default_port(),
            public_url: None,
        }
    }
}

impl WebhookConfig {
    const fn default_port() -> u16 {
        10000
    }
}

/// How updates reach the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentMode {
    Polling,
    Webhook { listen: SocketAddr, url: String },
}

impl Config {
    /// Load `~/mick/config.json` if present, then apply environment overrides.
    ///
    /// A `.env` file in the working directory is read first; variables
    /// already set in the process environment win over it.
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from {}", path.display());
        }

        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            info!("Loaded config from {}", config_path.display());
            serde_json::from_str(&content)?
        } else {
            info!(
                "No config file at {}, using defaults and environment",
                config_path.display()
            );
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override settings from environment variables, read through `lookup`.
    ///
    /// `RENDER` only has to be present to switch to webhook mode.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_TOKEN") {
            self.telegram.token = token;
        }
        if let Some(api_key) = lookup("OPENAI_API_KEY") {
            self.providers.openai.api_key = api_key;
        }
        if let Some(base_url) = lookup("OPENAI_BASE_URL") {
            self.providers.openai.base_url = Some(base_url);
        }
        if let Some(port) = lookup("PORT") {
            self.webhook.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT value {port:?}: {e}"))?;
        }
        if lookup("RENDER").is_some() {
            self.webhook.enabled = true;
        }
        if let Some(public_url) = lookup("RENDER_EXTERNAL_URL") {
            self.webhook.public_url = Some(public_url);
        }
        Ok(())
    }

    pub fn deployment_mode(&self) -> anyhow::Result<DeploymentMode> {
        if !self.webhook.enabled {
            return Ok(DeploymentMode::Polling);
        }

        let public_url = self
            .webhook
            .public_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("Webhook mode requires a public URL. Set RENDER_EXTERNAL_URL")
            })?;

        Ok(DeploymentMode::Webhook {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.webhook.port)),
            url: format!("{}{WEBHOOK_PATH}", public_url.trim_end_matches('/')),
        })
    }

    #[must_use]
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.agents.defaults.model.clone(),
            max_tokens: self.agents.defaults.max_tokens,
            temperature: self.agents.defaults.temperature,
        }
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("mick")
            .join("config.json"))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("mick");

        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "telegram": {
    "token": "your-telegram-bot-token-here"
  },
  "providers": {
    "openai": {
      "api_key": "your-openai-api-key-here",
      "timeout_secs": 120
    }
  },
  "agents": {
    "defaults": {
      "model": "gpt-3.5-turbo",
      "max_tokens": 500,
      "temperature": 0.7,
      "system_prompt": "You're a helpful assistant"
    }
  },
  "webhook": {
    "enabled": false,
    "port": 10000
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Telegram bot token and OpenAI API key");
        println!("      (or set TELEGRAM_TOKEN / OPENAI_API_KEY in the environment or a .env file)");
        println!("   2. Run 'mick run' to start the bot");
        println!();
        println!("🔧 Configuration options:");
        println!("   - model: completion model (gpt-3.5-turbo, gpt-4o-mini, etc.)");
        println!("   - webhook.enabled: receive updates via webhook instead of long polling");
        println!("     (set automatically when RENDER is present in the environment)");
        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn defaults_match_bot_constants() {
        let config = Config::default();
        assert_eq!(config.agents.defaults.model, "gpt-3.5-turbo");
        assert_eq!(config.agents.defaults.max_tokens, 500);
        assert_eq!(config.agents.defaults.system_prompt, "You're a helpful assistant");
        assert_eq!(config.webhook.port, 10000);
        assert_eq!(config.deployment_mode().ok(), Some(DeploymentMode::Polling));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"agents": {"defaults": {"model": "gpt-4o-mini"}}}"#)
                .unwrap_or_default();
        assert_eq!(config.agents.defaults.model, "gpt-4o-mini");
        assert_eq!(config.agents.defaults.max_tokens, 500);
        assert_eq!(config.providers.openai.timeout_secs, 120);
    }

    #[test]
    fn env_overrides_credentials_and_port() {
        let env = env_of(&[
            ("TELEGRAM_TOKEN", "123:abc"),
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "8443"),
        ]);
        let mut config = Config::default();
        assert!(config.apply_env(|k| env.get(k).cloned()).is_ok());

        assert_eq!(config.telegram.token, "123:abc");
        assert_eq!(config.providers.openai.api_key, "sk-test");
        assert_eq!(config.webhook.port, 8443);
        assert!(!config.webhook.enabled);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let env = env_of(&[("PORT", "not-a-port")]);
        let mut config = Config::default();
        assert!(config.apply_env(|k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn render_marker_selects_webhook() {
        let env = env_of(&[
            ("RENDER", ""),
            ("RENDER_EXTERNAL_URL", "https://mick.onrender.com/"),
        ]);
        let mut config = Config::default();
        assert!(config.apply_env(|k| env.get(k).cloned()).is_ok());

        let mode = config.deployment_mode().ok();
        assert_eq!(
            mode,
            Some(DeploymentMode::Webhook {
                listen: SocketAddr::from(([0, 0, 0, 0], 10000)),
                url: "https://mick.onrender.com/webhook".to_string(),
            })
        );
    }

    #[test]
    fn webhook_without_public_url_fails() {
        let mut config = Config::default();
        config.webhook.enabled = true;
        assert!(config.deployment_mode().is_err());
    }

    #[test]
    fn completion_config_follows_agent_defaults() {
        let mut config = Config::default();
        config.agents.defaults.temperature = 0.2;
        let completion = config.completion_config();
        assert_eq!(completion.model, "gpt-3.5-turbo");
        assert!((completion.temperature - 0.2).abs() < f32::EPSILON);
    }
}
