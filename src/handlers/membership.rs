use async_trait::async_trait;
use log::{debug, info};

use crate::dispatch::{Context, Handler};
use crate::error::Result;
use crate::event::{Event, Incoming};
use crate::templates::TemplateKey;

/// Introduces the bot in a channel it has just joined.
pub struct WelcomeChannel;

#[async_trait]
impl Handler for WelcomeChannel {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()> {
        let Incoming::Event(Event::MemberJoinedChannel(event)) = cx.incoming else {
            return Ok(());
        };
        if cx.store.get_me() != Some(event.user.as_str()) {
            debug!("{} joined {}", event.user, event.channel);
            return Ok(());
        }
        let Some(target) = cx.store.get_channel() else {
            info!(
                "Joined {} before a default channel was configured, skipping welcome",
                event.channel
            );
            return Ok(());
        };

        let welcome = cx.templates.render(
            TemplateKey::WelcomeChannel,
            &[("channelId", &target.id), ("channelName", &target.name)],
        );
        cx.api.post_message(&event.channel, &welcome).await
    }
}
