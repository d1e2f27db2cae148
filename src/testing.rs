//! Recording test doubles for the Slack API and envelope acknowledgement.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::bot::Bot;
use crate::dispatch::Acknowledge;
use crate::error::{BotError, Result};
use crate::event::Incoming;
use crate::slack::{ConversationInfo, SlackApi, UserInfo};
use crate::templates::MessageTemplate;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AuthTest,
    Permalink { channel: String, ts: String },
    UserInfo(String),
    ConversationInfo(String),
    Post { channel: String, message: MessageTemplate },
    Invite { channel: String, user: String },
    Respond { url: String, message: MessageTemplate },
}

pub struct MockSlack {
    calls: Mutex<Vec<Call>>,
    channel_names: HashMap<String, String>,
    real_names: HashMap<String, String>,
    bot_user_id: String,
    fail_posts: bool,
}

impl MockSlack {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            channel_names: HashMap::new(),
            real_names: HashMap::new(),
            bot_user_id: "UBOT".to_string(),
            fail_posts: false,
        }
    }

    pub fn with_channel(mut self, id: &str, name: &str) -> Self {
        self.channel_names.insert(id.to_string(), name.to_string());
        self
    }

    pub fn with_real_name(mut self, id: &str, name: &str) -> Self {
        self.real_names.insert(id.to_string(), name.to_string());
        self
    }

    pub fn failing_posts(mut self) -> Self {
        self.fail_posts = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    /// Messages posted with `chat.postMessage` or through a `response_url`.
    pub fn replies(&self) -> Vec<MessageTemplate> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Post { message, .. } | Call::Respond { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }
}

#[async_trait]
impl SlackApi for MockSlack {
    async fn auth_test(&self) -> Result<String> {
        self.record(Call::AuthTest);
        Ok(self.bot_user_id.clone())
    }

    async fn get_permalink(&self, channel: &str, message_ts: &str) -> Result<String> {
        self.record(Call::Permalink {
            channel: channel.to_string(),
            ts: message_ts.to_string(),
        });
        Ok(format!(
            "https://example.slack.com/archives/{channel}/p{}",
            message_ts.replace('.', "")
        ))
    }

    async fn user_info(&self, user: &str) -> Result<UserInfo> {
        self.record(Call::UserInfo(user.to_string()));
        let real_name = self.real_names.get(user).cloned();
        Ok(UserInfo {
            id: user.to_string(),
            name: format!("{}-handle", user.to_lowercase()),
            real_name: real_name.or_else(|| Some(format!("User {user}"))),
        })
    }

    async fn conversation_info(&self, channel: &str) -> Result<ConversationInfo> {
        self.record(Call::ConversationInfo(channel.to_string()));
        let name = self
            .channel_names
            .get(channel)
            .cloned()
            .ok_or_else(|| BotError::SlackApi {
                method: "conversations.info".to_string(),
                error: "channel_not_found".to_string(),
            })?;
        Ok(ConversationInfo {
            id: channel.to_string(),
            name,
        })
    }

    async fn post_message(&self, channel: &str, message: &MessageTemplate) -> Result<()> {
        if self.fail_posts {
            return Err(BotError::SlackApi {
                method: "chat.postMessage".to_string(),
                error: "not_in_channel".to_string(),
            });
        }
        self.record(Call::Post {
            channel: channel.to_string(),
            message: message.clone(),
        });
        Ok(())
    }

    async fn invite_to_channel(&self, channel: &str, user: &str) -> Result<()> {
        self.record(Call::Invite {
            channel: channel.to_string(),
            user: user.to_string(),
        });
        Ok(())
    }

    async fn respond(&self, response_url: &str, message: &MessageTemplate) -> Result<()> {
        self.record(Call::Respond {
            url: response_url.to_string(),
            message: message.clone(),
        });
        Ok(())
    }
}

pub struct RecordingAck {
    count: AtomicUsize,
}

impl RecordingAck {
    pub fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Acknowledge for RecordingAck {
    async fn ack(&self) -> Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn bot() -> (Bot, Arc<MockSlack>) {
    bot_with(MockSlack::new())
}

pub fn bot_with(api: MockSlack) -> (Bot, Arc<MockSlack>) {
    let api = Arc::new(api);
    let bot = Bot::new(api.clone()).expect("handlers register");
    (bot, api)
}

pub fn event(event: Value) -> Incoming {
    let payload = json!({ "type": "event_callback", "event": event });
    Incoming::from_envelope("events_api", payload)
        .expect("event decodes")
        .expect("events are handled")
}

pub fn action(action_id: &str, selected_channel: Option<&str>) -> Incoming {
    let mut action = json!({ "action_id": action_id, "block_id": "b1", "type": "channels_select" });
    if let Some(channel) = selected_channel {
        action["selected_channel"] = json!(channel);
    }
    Incoming::from_envelope(
        "interactive",
        json!({
            "type": "block_actions",
            "user": { "id": "U1", "username": "alice" },
            "container": { "type": "message", "channel_id": "D1" },
            "response_url": "https://hooks.slack.com/actions/T1/1/abc",
            "actions": [action]
        }),
    )
    .expect("action decodes")
    .expect("block actions are handled")
}

pub fn command(name: &str, text: &str) -> Incoming {
    Incoming::from_envelope(
        "slash_commands",
        json!({
            "command": name,
            "text": text,
            "user_id": "U1",
            "channel_id": "C1",
            "response_url": "https://hooks.slack.com/commands/T1/1/abc"
        }),
    )
    .expect("command decodes")
    .expect("commands are handled")
}
