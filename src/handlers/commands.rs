use async_trait::async_trait;

use crate::dispatch::{Context, Handler};
use crate::error::Result;
use crate::event::Incoming;

pub const ECHO: &str = "/echo";

/// `/echo <text>` repeats the text verbatim.
pub struct Echo;

#[async_trait]
impl Handler for Echo {
    async fn handle(&self, cx: &mut Context<'_>) -> Result<()> {
        cx.ack().await?;
        let Incoming::Command(command) = cx.incoming else {
            return Ok(());
        };
        cx.say(command.text.clone()).await
    }
}
