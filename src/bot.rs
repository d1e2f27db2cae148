//! Composition root: owns the record store, template table and dispatcher.

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;

use crate::config::Config;
use crate::dispatch::{Acknowledge, Dispatcher};
use crate::error::Result;
use crate::event::Incoming;
use crate::handlers;
use crate::slack::{SlackApi, SlackClient, SocketModeClient};
use crate::store::Store;
use crate::templates::Templates;

pub struct Bot {
    store: Store,
    templates: Templates,
    dispatcher: Dispatcher,
    api: Arc<dyn SlackApi>,
}

impl Bot {
    /// Builds a bot with an empty store and every built-in handler registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a handler pattern fails to compile.
    pub fn new(api: Arc<dyn SlackApi>) -> Result<Self> {
        let mut dispatcher = Dispatcher::new();
        handlers::register(&mut dispatcher)?;
        debug!("Registered {} handler bindings", dispatcher.len());

        Ok(Self {
            store: Store::new(),
            templates: Templates::new(),
            dispatcher,
            api,
        })
    }

    /// Looks up the bot's own user id so membership events can be told apart.
    ///
    /// # Errors
    ///
    /// Returns the `auth.test` failure.
    pub async fn identify(&mut self) -> Result<()> {
        let me = self.api.auth_test().await?;
        info!("Bot user id is {me}");
        self.store.set_me(me);
        Ok(())
    }

    /// Decodes a Socket Mode payload and dispatches it. Returns how many handlers fired.
    pub async fn handle_envelope(
        &mut self,
        envelope_type: &str,
        payload: Value,
        ack: &dyn Acknowledge,
    ) -> usize {
        match Incoming::from_envelope(envelope_type, payload) {
            Ok(Some(incoming)) => self.dispatch(&incoming, ack).await,
            Ok(None) => {
                debug!("Ignoring {envelope_type} envelope");
                0
            }
            Err(e) => {
                warn!("Dropping malformed {envelope_type} envelope: {e}");
                0
            }
        }
    }

    pub async fn dispatch(&mut self, incoming: &Incoming, ack: &dyn Acknowledge) -> usize {
        self.dispatcher
            .dispatch(
                incoming,
                &mut self.store,
                &self.templates,
                self.api.as_ref(),
                ack,
            )
            .await
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }
}

/// Run the Slack bot until Ctrl-C or the Socket Mode client gives up.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    let api = Arc::new(SlackClient::new(&config));
    let mut bot = Bot::new(api)?;
    bot.identify().await?;

    let socket = SocketModeClient::new(&config);
    info!("Starting Socket Mode client");

    tokio::select! {
        result = socket.run(&mut bot) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}
