//! Replies to plain text messages.

use async_trait::async_trait;
use log::{debug, info};

use crate::dispatch::{Context, Handler};
use crate::error::Result;
use crate::event::{Event, Incoming, MessageEvent};
use crate::templates::TemplateKey;

pub const GREETING_PATTERN: &str = r"(?i)^(hi|hello|hey)\b";

fn message<'a>(cx: &Context<'a>) -> Option<&'a MessageEvent> {
    match cx.incoming {
        Incoming::Event(Event::Message(message)) => Some(message),
        _ => None,
    }
}

/// Greets back with a button that triggers `button_click`.
pub struct Hello;

#[async_trait]
impl Handler for Hello {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()> {
        let Some(user) = message(cx).and_then(|m| m.user.as_deref()) else {
            return Ok(());
        };
        let reply = cx.templates.render(TemplateKey::Hello, &[("userId", user)]);
        cx.say(reply).await
    }
}

pub struct Wave;

#[async_trait]
impl Handler for Wave {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()> {
        let Some(user) = message(cx).and_then(|m| m.user.as_deref()) else {
            return Ok(());
        };
        cx.say(format!("Hello, <@{user}>")).await
    }
}

pub struct KnockKnock;

#[async_trait]
impl Handler for KnockKnock {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()> {
        cx.say("_Who's there?_").await
    }
}

pub struct Ping;

#[async_trait]
impl Handler for Ping {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()> {
        cx.say("pong").await
    }
}

/// Answers messages starting with a greeting word, echoing the word back.
pub struct Greeting;

#[async_trait]
impl Handler for Greeting {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()> {
        let Some(greeting) = cx.matches.get(1).filter(|g| !g.is_empty()) else {
            return Ok(());
        };
        let reply = format!("{greeting}, how are you?");
        cx.say(reply).await
    }
}

/// Logs messages posted by bots, this one included. Never replies.
pub struct BotMessage;

#[async_trait]
impl Handler for BotMessage {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()> {
        if let Some(message) = message(cx) {
            info!(
                "Bot message in channel {}: {}",
                message.channel, message.text
            );
            debug!("Bot id: {:?}", message.bot_id);
        }
        Ok(())
    }
}
