//! Trigger matching and handler dispatch.
//!
//! Bindings are checked in registration order and every binding whose [`Trigger`] matches
//! fires. Handler errors never escape [`Dispatcher::dispatch`]; they go to the error sink.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, warn};
use regex::Regex;

use crate::error::{BotError, Result};
use crate::event::{Event, EventKind, Incoming};
use crate::slack::SlackApi;
use crate::store::Store;
use crate::templates::{MessageTemplate, Templates};

/// What a binding listens for.
#[derive(Debug, Clone)]
pub enum Trigger {
    Event(EventKind),
    /// Message text equal to the string.
    Exact(String),
    /// Message text containing the string.
    Contains(String),
    /// Message text matching the expression; captures are handed to the handler.
    Regex(Regex),
    /// Message with the given subtype.
    Subtype(String),
    Action(String),
    Command(String),
}

impl Trigger {
    /// Compiles a message pattern.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Config`] if the pattern does not compile.
    pub fn regex(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Trigger::Regex)
            .map_err(|e| BotError::Config(format!("invalid message pattern '{pattern}': {e}")))
    }

    /// Returns the match captures when this trigger fires for `incoming`.
    ///
    /// Non-regex triggers return an empty list. Text triggers never fire for bot-authored messages.
    #[must_use]
    pub fn matches(&self, incoming: &Incoming) -> Option<Vec<String>> {
        match (self, incoming) {
            (Trigger::Event(kind), _) => (incoming.event_kind() == Some(*kind)).then(Vec::new),
            (Trigger::Subtype(subtype), Incoming::Event(Event::Message(message))) => {
                (message.subtype.as_deref() == Some(subtype.as_str())).then(Vec::new)
            }
            (
                Trigger::Exact(_) | Trigger::Contains(_) | Trigger::Regex(_),
                Incoming::Event(Event::Message(message)),
            ) if !message.is_bot_authored() => self.matches_text(&message.text),
            (Trigger::Action(action_id), Incoming::Action(action)) => {
                (action.action_id == *action_id).then(Vec::new)
            }
            (Trigger::Command(name), Incoming::Command(command)) => {
                (command.command == *name).then(Vec::new)
            }
            _ => None,
        }
    }

    fn matches_text(&self, text: &str) -> Option<Vec<String>> {
        match self {
            Trigger::Exact(expected) => (text == expected).then(Vec::new),
            Trigger::Contains(needle) => text.contains(needle.as_str()).then(Vec::new),
            Trigger::Regex(regex) => regex.captures(text).map(|captures| {
                captures
                    .iter()
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect()
            }),
            _ => None,
        }
    }
}

/// Acknowledges the delivery that carried the current payload.
#[async_trait]
pub trait Acknowledge: Send + Sync {
    async fn ack(&self) -> Result<()>;
}

/// Per-invocation handle given to a [`Handler`].
pub struct Context<'a> {
    pub store: &'a mut Store,
    pub templates: &'a Templates,
    pub api: &'a dyn SlackApi,
    pub incoming: &'a Incoming,
    /// Regex captures; empty for other triggers.
    pub matches: Vec<String>,
    ack: &'a dyn Acknowledge,
}

impl Context<'_> {
    /// Acknowledges the current delivery. Later calls for the same delivery send nothing.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the acknowledgement cannot be written.
    pub async fn ack(&self) -> Result<()> {
        self.ack.ack().await
    }

    /// Posts into the channel the payload came from.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::MalformedEvent`] when the payload has no channel, or the API error.
    pub async fn say(&self, message: impl Into<MessageTemplate> + Send) -> Result<()> {
        let Some(channel) = self.incoming.channel_id() else {
            let what = self.incoming.describe();
            return Err(BotError::MalformedEvent(format!("{what} has no channel to reply in")));
        };
        self.api.post_message(channel, &message.into()).await
    }

    /// Replies through the interaction's `response_url`, falling back to [`Context::say`].
    ///
    /// # Errors
    ///
    /// Returns the API error, or [`BotError::MalformedEvent`] when the fallback has no channel.
    pub async fn respond(&self, message: impl Into<MessageTemplate> + Send) -> Result<()> {
        match self.incoming.response_url() {
            Some(url) => self.api.respond(url, &message.into()).await,
            None => self.say(message).await,
        }
    }
}

#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()>;
}

type ErrorSink = Box<dyn Fn(&BotError, &Incoming) + Send + Sync>;

/// Default sink: log the failure and carry on.
fn log_error(err: &BotError, incoming: &Incoming) {
    if err.is_malformed() {
        warn!("Skipped malformed {}: {err}", incoming.describe());
    } else {
        error!("Handler for {} failed: {err}", incoming.describe());
    }
}

pub struct Dispatcher {
    bindings: Vec<(Trigger, Arc<dyn Handler>)>,
    sink: ErrorSink,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            sink: Box::new(log_error),
        }
    }

    pub fn on(&mut self, trigger: Trigger, handler: Arc<dyn Handler>) -> &mut Self {
        self.bindings.push((trigger, handler));
        self
    }

    /// Replaces the error sink.
    pub fn on_error(
        &mut self,
        sink: impl Fn(&BotError, &Incoming) + Send + Sync + 'static,
    ) -> &mut Self {
        self.sink = Box::new(sink);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Runs every matching binding in order and returns how many fired.
    pub async fn dispatch(
        &self,
        incoming: &Incoming,
        store: &mut Store,
        templates: &Templates,
        api: &dyn SlackApi,
        ack: &dyn Acknowledge,
    ) -> usize {
        let mut fired = 0;
        for (trigger, handler) in &self.bindings {
            let Some(matches) = trigger.matches(incoming) else {
                continue;
            };
            debug!("Dispatching {} to {trigger:?}", incoming.describe());
            fired += 1;

            let mut cx = Context {
                store: &mut *store,
                templates,
                api,
                incoming,
                matches,
                ack,
            };
            if let Err(e) = handler.handle(&mut cx).await {
                (self.sink)(&e, incoming);
            }
        }
        if fired == 0 {
            debug!("No binding for {}", incoming.describe());
        }
        fired
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
