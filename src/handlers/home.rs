//! App Home greeting.

use async_trait::async_trait;
use log::info;

use crate::dispatch::{Context, Handler};
use crate::error::Result;
use crate::event::{Event, Incoming};
use crate::store::UserRecord;
use crate::templates::TemplateKey;

/// Welcomes first-time visitors of the App Home and remembers them.
pub struct AppHomeOpened;

#[async_trait]
impl Handler for AppHomeOpened {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()> {
        let Incoming::Event(Event::AppHomeOpened(event)) = cx.incoming else {
            return Ok(());
        };

        if cx.store.get_user(&event.user).is_some() {
            return cx.say("Hi again!").await;
        }

        cx.store.add_user(UserRecord {
            user_id: event.user.clone(),
            channel_id: event.channel.clone(),
        });
        info!("New user {} opened the App Home", event.user);
        let welcome = cx.templates.get(TemplateKey::WelcomeAppHome).clone();
        cx.say(welcome).await
    }
}
