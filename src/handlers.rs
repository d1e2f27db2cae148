//! The bot's behaviors and their trigger bindings.

mod actions;
mod commands;
mod home;
mod membership;
mod messages;
mod reactions;

use std::sync::Arc;

use crate::dispatch::{Dispatcher, Trigger};
use crate::error::Result;
use crate::event::{BOT_MESSAGE_SUBTYPE, EventKind};

/// Registers every built-in binding on `dispatcher`.
///
/// # Errors
///
/// Returns an error if a message pattern fails to compile.
pub fn register(dispatcher: &mut Dispatcher) -> Result<()> {
    dispatcher
        .on(
            Trigger::Event(EventKind::AppHomeOpened),
            Arc::new(home::AppHomeOpened),
        )
        .on(
            Trigger::Event(EventKind::ReactionAdded),
            Arc::new(reactions::ForwardZapped),
        )
        .on(
            Trigger::Event(EventKind::MemberJoinedChannel),
            Arc::new(membership::WelcomeChannel),
        )
        .on(
            Trigger::Action(actions::CONFIGURE_CHANNEL.to_string()),
            Arc::new(actions::ConfigureChannel),
        )
        .on(
            Trigger::Action(actions::ADD_TO_CHANNEL.to_string()),
            Arc::new(actions::AddToChannel),
        )
        .on(
            Trigger::Action(actions::BUTTON_CLICK.to_string()),
            Arc::new(actions::ButtonClick),
        )
        .on(
            Trigger::Contains("hello".to_string()),
            Arc::new(messages::Hello),
        )
        .on(
            Trigger::Contains(":wave:".to_string()),
            Arc::new(messages::Wave),
        )
        .on(
            Trigger::Contains("knock knock".to_string()),
            Arc::new(messages::KnockKnock),
        )
        .on(
            Trigger::Contains("ping".to_string()),
            Arc::new(messages::Ping),
        )
        .on(
            Trigger::regex(messages::GREETING_PATTERN)?,
            Arc::new(messages::Greeting),
        )
        .on(
            Trigger::Subtype(BOT_MESSAGE_SUBTYPE.to_string()),
            Arc::new(messages::BotMessage),
        )
        .on(
            Trigger::Command(commands::ECHO.to_string()),
            Arc::new(commands::Echo),
        );
    Ok(())
}
