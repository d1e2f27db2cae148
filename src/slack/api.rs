//! Outbound Slack Web API calls.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::Config;
use crate::error::{BotError, Result};
use crate::templates::MessageTemplate;

/// Profile fields returned by `users.info`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub real_name: Option<String>,
}

impl UserInfo {
    /// Real name when the profile has one, otherwise the handle.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.real_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationInfo {
    pub id: String,
    pub name: String,
}

/// The Slack calls handlers are allowed to make.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// Returns the user id of the token's bot user.
    async fn auth_test(&self) -> Result<String>;

    async fn get_permalink(&self, channel: &str, message_ts: &str) -> Result<String>;

    async fn user_info(&self, user: &str) -> Result<UserInfo>;

    async fn conversation_info(&self, channel: &str) -> Result<ConversationInfo>;

    async fn post_message(&self, channel: &str, message: &MessageTemplate) -> Result<()>;

    /// Invites `user` to `channel`. Uses the user token, since a bot cannot invite itself.
    async fn invite_to_channel(&self, channel: &str, user: &str) -> Result<()>;

    /// Posts to an interaction's `response_url`.
    async fn respond(&self, response_url: &str, message: &MessageTemplate) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct PermalinkResponse {
    permalink: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    user: UserInfo,
}

#[derive(Debug, Deserialize)]
struct ConversationInfoResponse {
    channel: ConversationInfo,
}

/// Web API client backed by `reqwest`.
pub struct SlackClient {
    client: Client,
    api_base: String,
    bot_token: String,
    user_token: String,
}

impl SlackClient {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_base: config.slack_api_base.clone(),
            bot_token: config.slack_bot_token.clone(),
            user_token: config.slack_user_token.clone(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        method: &str,
        token: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("Calling Slack {method}");
        let response = self
            .client
            .get(format!("{}/{method}", self.api_base))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        parse_response(method, response).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        method: &str,
        token: &str,
        body: &Value,
    ) -> Result<T> {
        debug!("Calling Slack {method}");
        let response = self
            .client
            .post(format!("{}/{method}", self.api_base))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        parse_response(method, response).await
    }
}

async fn parse_response<T: DeserializeOwned>(
    method: &str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(BotError::SlackHttp {
            method: method.to_string(),
            status,
        });
    }
    let body: Value = response.json().await?;
    check_ok(method, &body)?;
    Ok(serde_json::from_value(body)?)
}

/// Every Web API response carries `ok`; `false` comes with an `error` code.
pub(super) fn check_ok(method: &str, body: &Value) -> Result<()> {
    if body.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }
    let error = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    Err(BotError::SlackApi {
        method: method.to_string(),
        error: error.to_string(),
    })
}

fn message_body(channel: &str, message: &MessageTemplate) -> Result<Value> {
    let mut body = serde_json::to_value(message)?;
    body["channel"] = json!(channel);
    Ok(body)
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn auth_test(&self) -> Result<String> {
        let auth: AuthTestResponse = self.post("auth.test", &self.bot_token, &json!({})).await?;
        Ok(auth.user_id)
    }

    async fn get_permalink(&self, channel: &str, message_ts: &str) -> Result<String> {
        let response: PermalinkResponse = self
            .get(
                "chat.getPermalink",
                &self.bot_token,
                &[("channel", channel), ("message_ts", message_ts)],
            )
            .await?;
        Ok(response.permalink)
    }

    async fn user_info(&self, user: &str) -> Result<UserInfo> {
        let response: UserInfoResponse = self
            .get("users.info", &self.bot_token, &[("user", user)])
            .await?;
        Ok(response.user)
    }

    async fn conversation_info(&self, channel: &str) -> Result<ConversationInfo> {
        let response: ConversationInfoResponse = self
            .get(
                "conversations.info",
                &self.bot_token,
                &[("channel", channel)],
            )
            .await?;
        Ok(response.channel)
    }

    async fn post_message(&self, channel: &str, message: &MessageTemplate) -> Result<()> {
        let payload = message_body(channel, message)?;
        let _: Value = self
            .post("chat.postMessage", &self.bot_token, &payload)
            .await?;
        Ok(())
    }

    async fn invite_to_channel(&self, channel: &str, user: &str) -> Result<()> {
        let body = json!({ "channel": channel, "users": user });
        let _: Value = self
            .post("conversations.invite", &self.user_token, &body)
            .await?;
        Ok(())
    }

    async fn respond(&self, response_url: &str, message: &MessageTemplate) -> Result<()> {
        debug!("Posting to response_url");
        let response = self.client.post(response_url).json(message).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BotError::SlackHttp {
                method: "response_url".to_string(),
                status,
            });
        }
        Ok(())
    }
}
