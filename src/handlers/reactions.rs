//! `:zap:` forwarding.

use async_trait::async_trait;
use log::{debug, info};

use crate::dispatch::{Context, Handler};
use crate::error::Result;
use crate::event::{Event, Incoming};
use crate::templates::TemplateKey;

const ZAP: &str = "zap";

/// Posts a permalink to any message reacted to with `:zap:` into the default channel.
pub struct ForwardZapped;

#[async_trait]
impl Handler for ForwardZapped {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()> {
        let Incoming::Event(Event::ReactionAdded(event)) = cx.incoming else {
            return Ok(());
        };
        if event.reaction != ZAP {
            debug!("Ignoring :{}: reaction", event.reaction);
            return Ok(());
        }

        let message = event.item.message_ref()?;
        let Some(target) = cx.store.get_channel().cloned() else {
            info!("No default channel configured, not forwarding zapped message");
            return Ok(());
        };

        let permalink = cx.api.get_permalink(message.channel, message.ts).await?;
        let user = cx.api.user_info(&event.user).await?;

        // The user-controlled name goes in last so it cannot swallow another placeholder.
        let notice = cx.templates.render(
            TemplateKey::ForwardedMessage,
            &[
                ("permalink", &permalink),
                ("channelId", message.channel),
                ("userName", user.display_name()),
            ],
        );
        cx.api.post_message(&target.id, &notice).await?;
        info!(
            "Forwarded message {} from {} to {}",
            message.ts, message.channel, target.id
        );
        Ok(())
    }
}
