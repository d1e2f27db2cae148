use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Slack API error in {method}: {error}")]
    SlackApi { method: String, error: String },

    #[error("Slack API HTTP error in {method} ({status})")]
    SlackHttp { method: String, status: StatusCode },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Exceeded {0} Socket Mode reconnect attempts")]
    ReconnectLimit(u32),
}

impl From<tokio_tungstenite::tungstenite::Error> for BotError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        BotError::WebSocket(Box::new(err))
    }
}

impl BotError {
    /// Returns true for payloads that could not be decoded into the shape a handler needs.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, BotError::MalformedEvent(_))
    }

    /// Returns true when the failure came from a call to the Slack platform.
    #[must_use]
    pub fn is_platform_failure(&self) -> bool {
        matches!(
            self,
            BotError::Reqwest(_) | BotError::SlackApi { .. } | BotError::SlackHttp { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
