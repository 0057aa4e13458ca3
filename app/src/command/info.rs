use mick_config::{Config, DeploymentMode};
use mick_core::truncate_chars;

/// Strategy for displaying configuration information.
///
/// Prints the effective configuration (file plus environment) with
/// credentials masked.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== mick Configuration ===\n");

        println!("Config File:");
        println!("  Path: {}", Config::config_path()?.display());
        println!();

        println!("Completion Provider:");
        println!("  API Key: {}", mask_secret(&config.providers.openai.api_key));
        println!(
            "  Base URL: {}",
            config
                .providers
                .openai
                .base_url
                .as_deref()
                .unwrap_or("(default)")
        );
        println!("  Timeout: {}s", config.providers.openai.timeout_secs);
        println!();

        println!("Agent Defaults:");
        println!("  Model: {}", config.agents.defaults.model);
        println!("  Max Tokens: {}", config.agents.defaults.max_tokens);
        println!("  Temperature: {}", config.agents.defaults.temperature);
        println!(
            "  System Prompt: {}",
            truncate(&config.agents.defaults.system_prompt, 60)
        );
        println!();

        println!("Telegram:");
        println!("  Token: {}", mask_secret(&config.telegram.token));
        match config.deployment_mode() {
            Ok(DeploymentMode::Polling) => println!("  Mode: polling"),
            Ok(DeploymentMode::Webhook { listen, url }) => {
                println!("  Mode: webhook");
                println!("  Listen: {listen}");
                println!("  URL: {url}");
            }
            Err(e) => println!("  Mode: invalid ({e})"),
        }

        Ok(())
    }
}

fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if secret.is_empty() {
        "(not set)".to_string()
    } else if len > 8 {
        let head = truncate_chars(secret, 4);
        let tail: String = secret.chars().skip(len - 4).collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", truncate_chars(s, max_len.saturating_sub(3)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_long_secrets() {
        assert_eq!(mask_secret("sk-abcdefghijkl"), "sk-a...ijkl");
        assert_eq!(mask_secret("short"), "***");
        assert_eq!(mask_secret(""), "(not set)");
    }

    #[test]
    fn truncates_long_prompt() {
        assert_eq!(truncate("abcdefghij", 6), "abc...");
        assert_eq!(truncate("abc", 6), "abc");
    }
}
