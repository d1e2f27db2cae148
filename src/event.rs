//! Typed inbound payloads.
//!
//! Socket Mode delivers three kinds of envelope: Events API callbacks, slash commands and
//! interactive component payloads. Each is decoded here into an [`Incoming`] value so the
//! dispatcher matches on variants instead of probing JSON.

use serde::Deserialize;
use serde_json::Value;
use strum::Display;

use crate::error::{BotError, Result};

/// Subtype Slack puts on messages authored by bots, including this one.
pub const BOT_MESSAGE_SUBTYPE: &str = "bot_message";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    AppHomeOpened,
    Message,
    ReactionAdded,
    MemberJoinedChannel,
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    AppHomeOpened(AppHomeOpenedEvent),
    Message(MessageEvent),
    ReactionAdded(ReactionAddedEvent),
    MemberJoinedChannel(MemberJoinedChannelEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppHomeOpenedEvent {
    pub user: String,
    pub channel: String,
    #[serde(default)]
    pub tab: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub user: Option<String>,
    pub channel: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

impl MessageEvent {
    /// Messages posted by a bot user, which must never trigger a reply.
    #[must_use]
    pub fn is_bot_authored(&self) -> bool {
        self.subtype.as_deref() == Some(BOT_MESSAGE_SUBTYPE) || self.bot_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReactionAddedEvent {
    pub user: String,
    pub reaction: String,
    #[serde(default)]
    pub item: ReactionItem,
    #[serde(default)]
    pub item_user: Option<String>,
}

/// The message a reaction was attached to. Fields are optional on the wire and
/// checked by [`ReactionItem::message_ref`] once a handler actually needs them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReactionItem {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

/// Channel and timestamp of a reacted-to message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef<'a> {
    pub channel: &'a str,
    pub ts: &'a str,
}

impl ReactionItem {
    /// Extracts the channel and timestamp of the reacted message.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::MalformedEvent`] when either field is missing or empty.
    pub fn message_ref(&self) -> Result<MessageRef<'_>> {
        let channel = non_empty(self.channel.as_deref())
            .ok_or_else(|| BotError::MalformedEvent("reaction_added without item.channel".into()))?;
        let ts = non_empty(self.ts.as_deref())
            .ok_or_else(|| BotError::MalformedEvent("reaction_added without item.ts".into()))?;
        Ok(MessageRef { channel, ts })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemberJoinedChannelEvent {
    pub user: String,
    pub channel: String,
}

/// A slash command invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SlashCommand {
    pub command: String,
    #[serde(default)]
    pub text: String,
    pub user_id: String,
    pub channel_id: String,
    #[serde(default)]
    pub response_url: Option<String>,
}

/// A single interactive component action, flattened out of a `block_actions` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockAction {
    pub action_id: String,
    pub user_id: String,
    pub channel_id: Option<String>,
    pub selected_channel: Option<String>,
    pub value: Option<String>,
    pub response_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlockActionsPayload {
    user: IdRef,
    #[serde(default)]
    channel: Option<IdRef>,
    #[serde(default)]
    container: Option<Container>,
    #[serde(default)]
    response_url: Option<String>,
    actions: Vec<RawAction>,
}

#[derive(Debug, Deserialize)]
struct IdRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Container {
    #[serde(default)]
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAction {
    action_id: String,
    #[serde(default)]
    selected_channel: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Event(Event),
    Action(BlockAction),
    Command(SlashCommand),
}

impl Incoming {
    /// Decodes a Socket Mode envelope payload.
    ///
    /// Returns `Ok(None)` for envelope and interaction types the bot does not handle.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::MalformedEvent`] when the payload does not have the expected shape.
    pub fn from_envelope(envelope_type: &str, payload: Value) -> Result<Option<Self>> {
        match envelope_type {
            "events_api" => {
                let event = payload
                    .get("event")
                    .cloned()
                    .ok_or_else(|| BotError::MalformedEvent("events_api without event".into()))?;
                let event: Event = serde_json::from_value(event)
                    .map_err(|e| BotError::MalformedEvent(format!("event: {e}")))?;
                Ok(Some(Incoming::Event(event)))
            }
            "slash_commands" => {
                let command: SlashCommand = serde_json::from_value(payload)
                    .map_err(|e| BotError::MalformedEvent(format!("slash command: {e}")))?;
                Ok(Some(Incoming::Command(command)))
            }
            "interactive" => {
                if payload.get("type").and_then(Value::as_str) != Some("block_actions") {
                    return Ok(None);
                }
                let payload: BlockActionsPayload = serde_json::from_value(payload)
                    .map_err(|e| BotError::MalformedEvent(format!("block_actions: {e}")))?;
                Ok(BlockAction::first_of(payload).map(Incoming::Action))
            }
            _ => Ok(None),
        }
    }

    #[must_use]
    pub fn event_kind(&self) -> Option<EventKind> {
        let Incoming::Event(event) = self else {
            return None;
        };
        Some(match event {
            Event::AppHomeOpened(_) => EventKind::AppHomeOpened,
            Event::Message(_) => EventKind::Message,
            Event::ReactionAdded(_) => EventKind::ReactionAdded,
            Event::MemberJoinedChannel(_) => EventKind::MemberJoinedChannel,
            Event::Other => EventKind::Other,
        })
    }

    /// The channel a reply to this payload should go to, if there is one.
    #[must_use]
    pub fn channel_id(&self) -> Option<&str> {
        match self {
            Incoming::Event(Event::AppHomeOpened(e)) => Some(&e.channel),
            Incoming::Event(Event::Message(e)) => Some(&e.channel),
            Incoming::Event(Event::ReactionAdded(e)) => e.item.channel.as_deref(),
            Incoming::Event(Event::MemberJoinedChannel(e)) => Some(&e.channel),
            Incoming::Event(Event::Other) => None,
            Incoming::Action(action) => action.channel_id.as_deref(),
            Incoming::Command(command) => Some(&command.channel_id),
        }
    }

    /// The user who triggered this payload, if known.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Incoming::Event(Event::AppHomeOpened(e)) => Some(&e.user),
            Incoming::Event(Event::Message(e)) => e.user.as_deref(),
            Incoming::Event(Event::ReactionAdded(e)) => Some(&e.user),
            Incoming::Event(Event::MemberJoinedChannel(e)) => Some(&e.user),
            Incoming::Event(Event::Other) => None,
            Incoming::Action(action) => Some(&action.user_id),
            Incoming::Command(command) => Some(&command.user_id),
        }
    }

    #[must_use]
    pub fn response_url(&self) -> Option<&str> {
        match self {
            Incoming::Action(action) => action.response_url.as_deref(),
            Incoming::Command(command) => command.response_url.as_deref(),
            Incoming::Event(_) => None,
        }
    }

    /// Short description used in log lines.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Incoming::Event(_) => {
                let kind = self.event_kind().unwrap_or(EventKind::Other);
                format!("event {kind}")
            }
            Incoming::Action(action) => format!("action {}", action.action_id),
            Incoming::Command(command) => format!("command {}", command.command),
        }
    }
}

impl BlockAction {
    fn first_of(payload: BlockActionsPayload) -> Option<Self> {
        let channel_id = payload
            .channel
            .map(|c| c.id)
            .or_else(|| payload.container.and_then(|c| c.channel_id));
        let action = payload.actions.into_iter().next()?;
        Some(BlockAction {
            action_id: action.action_id,
            user_id: payload.user.id,
            channel_id,
            selected_channel: action.selected_channel,
            value: action.value,
            response_url: payload.response_url,
        })
    }
}
