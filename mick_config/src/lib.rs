mod schema;

pub use schema::{
    AgentDefaults, AgentsConfig, Config, DeploymentMode, ProviderConfig, ProvidersConfig,
    TelegramConfig, WebhookConfig,
};
