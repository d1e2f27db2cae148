//! Interactive component actions from the App Home and channel messages.

use async_trait::async_trait;
use log::{info, warn};

use crate::dispatch::{Context, Handler};
use crate::error::{BotError, Result};
use crate::event::{BlockAction, Incoming};
use crate::store::ChannelRecord;
use crate::templates::TemplateKey;

pub const CONFIGURE_CHANNEL: &str = "configure_channel";
pub const ADD_TO_CHANNEL: &str = "add_to_channel";
pub const BUTTON_CLICK: &str = "button_click";

fn action<'a>(cx: &Context<'a>) -> Option<&'a BlockAction> {
    match cx.incoming {
        Incoming::Action(action) => Some(action),
        _ => None,
    }
}

fn selected_channel(action: &BlockAction) -> Result<&str> {
    let channel = action.selected_channel.as_deref().unwrap_or_default();
    if channel.is_empty() {
        let id = &action.action_id;
        return Err(BotError::MalformedEvent(format!("{id} without selected_channel")));
    }
    Ok(channel)
}

/// Stores the picked channel as the forwarding target.
pub struct ConfigureChannel;

#[async_trait]
impl Handler for ConfigureChannel {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()> {
        cx.ack().await?;
        let Some(action) = action(cx) else {
            return Ok(());
        };
        let channel_id = selected_channel(action)?;
        let channel = cx.api.conversation_info(channel_id).await?;

        cx.store.set_channel(ChannelRecord {
            id: channel.id.clone(),
            name: channel.name.clone(),
        });
        info!("Default channel set to #{} ({})", channel.name, channel.id);

        let reply = cx.templates.render(
            TemplateKey::ChannelConfigured,
            &[("channelId", &channel.id), ("channelName", &channel.name)],
        );
        cx.respond(reply).await
    }
}

/// Invites the bot user into the picked channel.
pub struct AddToChannel;

#[async_trait]
impl Handler for AddToChannel {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()> {
        cx.ack().await?;
        let Some(action) = action(cx) else {
            return Ok(());
        };
        let channel_id = selected_channel(action)?;
        let Some(me) = cx.store.get_me().map(str::to_string) else {
            warn!("Bot identity unknown, cannot invite the bot to {channel_id}");
            return Ok(());
        };

        cx.api.invite_to_channel(channel_id, &me).await?;
        let channel = cx.api.conversation_info(channel_id).await?;
        info!("Bot invited to #{} ({})", channel.name, channel.id);

        let reply = cx.templates.render(
            TemplateKey::AddedToChannel,
            &[("channelId", &channel.id), ("channelName", &channel.name)],
        );
        cx.say(reply).await
    }
}

pub struct ButtonClick;

#[async_trait]
impl Handler for ButtonClick {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()> {
        cx.ack().await?;
        let Some(action) = action(cx) else {
            return Ok(());
        };
        let reply = format!("<@{}> clicked the button", action.user_id);
        cx.say(reply).await
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{self, Call, MockSlack, RecordingAck};

    #[tokio::test]
    async fn configure_channel_stores_and_confirms() {
        let (mut bot, api) = testing::bot_with(MockSlack::new().with_channel("C42", "general"));
        let ack = RecordingAck::new();

        let incoming = testing::action("configure_channel", Some("C42"));
        bot.dispatch(&incoming, &ack).await;

        assert_eq!(ack.count(), 1);
        let channel = bot.store().get_channel().expect("channel stored");
        assert_eq!(channel.id, "C42");
        assert_eq!(channel.name, "general");

        let replies = api.replies();
        assert_eq!(replies.len(), 1);
        let reply = &replies[0];
        assert!(reply.text.contains("C42"));
        assert!(reply.text.contains("general"));
        assert!(!reply.has_placeholders());
        let blocks = reply.blocks.as_ref().expect("has blocks").to_string();
        assert!(blocks.contains("<#C42|general>"));
        assert!(matches!(api.calls().last(), Some(Call::Respond { .. })));
    }

    #[tokio::test]
    async fn reconfiguring_keeps_only_latest_channel() {
        let (mut bot, _api) = testing::bot_with(
            MockSlack::new()
                .with_channel("C1", "random")
                .with_channel("C42", "general"),
        );
        let ack = RecordingAck::new();

        bot.dispatch(&testing::action("configure_channel", Some("C1")), &ack)
            .await;
        bot.dispatch(&testing::action("configure_channel", Some("C42")), &ack)
            .await;

        let channel = bot.store().get_channel().expect("channel stored");
        assert_eq!(channel.id, "C42");
    }

    #[tokio::test]
    async fn configure_without_selection_is_acked_but_unchanged() {
        let (mut bot, api) = testing::bot();
        let ack = RecordingAck::new();

        let incoming = testing::action("configure_channel", None);
        bot.dispatch(&incoming, &ack).await;

        assert_eq!(ack.count(), 1);
        assert!(bot.store().get_channel().is_none());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn add_to_channel_invites_bot_then_announces() {
        let (mut bot, api) = testing::bot_with(MockSlack::new().with_channel("C7", "team"));
        bot.store_mut().set_me("UBOT");

        let incoming = testing::action("add_to_channel", Some("C7"));
        bot.dispatch(&incoming, &RecordingAck::new()).await;

        let calls = api.calls();
        assert_eq!(
            calls[0],
            Call::Invite {
                channel: "C7".to_string(),
                user: "UBOT".to_string(),
            }
        );
        let Some(Call::Post { channel, message }) = calls.last() else {
            panic!("expected a post");
        };
        assert_eq!(channel, "D1");
        assert!(!message.has_placeholders());
        let blocks = message.blocks.as_ref().expect("has blocks").to_string();
        assert!(blocks.contains("<#C7|team>"));
    }

    #[tokio::test]
    async fn add_to_channel_waits_for_bot_identity() {
        let (mut bot, api) = testing::bot_with(MockSlack::new().with_channel("C7", "team"));
        let ack = RecordingAck::new();

        let incoming = testing::action("add_to_channel", Some("C7"));
        bot.dispatch(&incoming, &ack).await;

        assert_eq!(ack.count(), 1);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn button_click_names_the_user() {
        let (mut bot, api) = testing::bot();
        let ack = RecordingAck::new();

        let incoming = testing::action("button_click", None);
        bot.dispatch(&incoming, &ack).await;

        assert_eq!(ack.count(), 1);
        let texts: Vec<String> = api.replies().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["<@U1> clicked the button"]);
    }
}
