use std::env;

use log::{debug, error, info};

use crate::error::{BotError, Result};

const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, Clone)]
pub struct Config {
    pub slack_bot_token: String,
    pub slack_user_token: String,
    pub slack_app_token: String,
    pub slack_api_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let slack_bot_token = required("SLACK_BOT_TOKEN")?;
        let slack_user_token = required("SLACK_USER_TOKEN")?;
        let slack_app_token = required("SLACK_APP_TOKEN")?;
        let slack_api_base = env::var("SLACK_API_BASE")
            .unwrap_or_else(|_| DEFAULT_SLACK_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let config = Self {
            slack_bot_token,
            slack_user_token,
            slack_app_token,
            slack_api_base,
        };
        config.validate()?;

        info!("Configuration loaded successfully");
        debug!(
            "Slack bot token length: {} characters",
            config.slack_bot_token.len()
        );
        debug!(
            "Slack user token length: {} characters",
            config.slack_user_token.len()
        );
        debug!(
            "Slack app token length: {} characters",
            config.slack_app_token.len()
        );
        debug!("Slack API base: {}", config.slack_api_base);

        Ok(config)
    }

    /// Checks token prefixes so a swapped variable fails at startup instead of on first call.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Config`] when a token is empty or has the wrong prefix.
    pub fn validate(&self) -> Result<()> {
        check_prefix("SLACK_BOT_TOKEN", &self.slack_bot_token, "xoxb-")?;
        check_prefix("SLACK_USER_TOKEN", &self.slack_user_token, "xoxp-")?;
        check_prefix("SLACK_APP_TOKEN", &self.slack_app_token, "xapp-")?;
        if self.slack_api_base.is_empty() {
            return Err(BotError::Config("SLACK_API_BASE is empty".to_string()));
        }
        Ok(())
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|e| {
        error!("Failed to load {name} from environment: {e}");
        BotError::from(e)
    })
}

fn check_prefix(name: &str, value: &str, prefix: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BotError::Config(format!("{name} is empty")));
    }
    if !value.starts_with(prefix) {
        return Err(BotError::Config(format!("{name} should start with '{prefix}'")));
    }
    Ok(())
}
