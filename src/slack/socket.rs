//! Socket Mode transport.
//!
//! Opens a WebSocket with `apps.connections.open`, acknowledges every envelope exactly once
//! and hands its payload to the [`Bot`]. Envelopes are processed one at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt};
use log::{debug, error, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::bot::Bot;
use crate::config::Config;
use crate::dispatch::Acknowledge;
use crate::error::{BotError, Result};

use super::api::check_ok;

const RECONNECT_DELAY_SECS: u64 = 5;
const MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// One text frame from the Socket Mode connection.
#[derive(Debug, Deserialize)]
struct SocketFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    envelope_id: Option<String>,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct SocketAck<'a> {
    envelope_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ConnectionsOpenResponse {
    url: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Reconnect,
}

fn parse_frame(text: &str) -> Result<SocketFrame> {
    Ok(serde_json::from_str(text)?)
}

fn ack_body(envelope_id: &str) -> Result<String> {
    Ok(serde_json::to_string(&SocketAck { envelope_id })?)
}

/// Acknowledges one envelope over the connection it arrived on. Repeated calls are no-ops.
struct EnvelopeAck<'a, S> {
    envelope_id: &'a str,
    sink: &'a Mutex<S>,
    sent: AtomicBool,
}

impl<'a, S> EnvelopeAck<'a, S>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin + Send,
{
    fn new(envelope_id: &'a str, sink: &'a Mutex<S>) -> Self {
        Self {
            envelope_id,
            sink,
            sent: AtomicBool::new(false),
        }
    }

    async fn ack_or_log(&self) {
        if let Err(e) = self.ack().await {
            warn!("Failed to acknowledge envelope {}: {e}", self.envelope_id);
        }
    }
}

#[async_trait]
impl<S> Acknowledge for EnvelopeAck<'_, S>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin + Send,
{
    async fn ack(&self) -> Result<()> {
        if self.sent.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let body = ack_body(self.envelope_id)?;
        self.sink
            .lock()
            .await
            .send(Message::Text(body.into()))
            .await?;
        debug!("Acknowledged envelope {}", self.envelope_id);
        Ok(())
    }
}

pub struct SocketModeClient {
    client: Client,
    api_base: String,
    app_token: String,
}

impl SocketModeClient {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_base: config.slack_api_base.clone(),
            app_token: config.slack_app_token.clone(),
        }
    }

    /// Calls `apps.connections.open` for a fresh WebSocket URL.
    async fn open_connection(&self) -> Result<String> {
        let method = "apps.connections.open";
        let response = self
            .client
            .post(format!("{}/{method}", self.api_base))
            .bearer_auth(&self.app_token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BotError::SlackHttp {
                method: method.to_string(),
                status,
            });
        }
        let body: Value = response.json().await?;
        check_ok(method, &body)?;
        let response: ConnectionsOpenResponse = serde_json::from_value(body)?;
        Ok(response.url)
    }

    /// Serves envelopes until the reconnect budget runs out.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::ReconnectLimit`] after too many consecutive failed connections.
    pub async fn run(&self, bot: &mut Bot) -> Result<()> {
        let mut attempts: u32 = 0;

        loop {
            if attempts >= MAX_RECONNECT_ATTEMPTS {
                return Err(BotError::ReconnectLimit(MAX_RECONNECT_ATTEMPTS));
            }
            if attempts > 0 {
                let delay = Duration::from_secs(RECONNECT_DELAY_SECS * u64::from(attempts.min(6)));
                info!(
                    "Reconnecting to Slack Socket Mode in {}s (attempt {attempts})",
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
            }

            let url = match self.open_connection().await {
                Ok(url) => url,
                Err(e) => {
                    error!("Failed to open Socket Mode connection: {e}");
                    attempts += 1;
                    continue;
                }
            };

            let stream = match tokio_tungstenite::connect_async(url.as_str()).await {
                Ok((stream, _)) => {
                    info!("Connected to Slack Socket Mode");
                    attempts = 0;
                    stream
                }
                Err(e) => {
                    error!("WebSocket connect failed: {e}");
                    attempts += 1;
                    continue;
                }
            };

            if let Err(e) = serve(stream, bot).await {
                warn!("Socket Mode connection lost: {e}");
            }
            attempts += 1;
        }
    }
}

async fn serve(stream: WebSocketStream<MaybeTlsStream<TcpStream>>, bot: &mut Bot) -> Result<()> {
    let (write, read) = stream.split();
    let sink = Mutex::new(write);
    let outcome = pump(read, bot, &sink).await;

    // Best effort: the server may already be gone.
    let _ = sink.lock().await.close().await;
    outcome
}

/// Feeds inbound frames to the bot until Slack closes or asks for a reconnect.
async fn pump<R, S>(mut read: R, bot: &mut Bot, sink: &Mutex<S>) -> Result<()>
where
    R: Stream<Item = tungstenite::Result<Message>> + Unpin,
    S: Sink<Message, Error = tungstenite::Error> + Unpin + Send,
{
    while let Some(message) = read.next().await {
        match message? {
            Message::Text(text) => {
                if handle_text(text.as_str(), bot, &sink).await == Flow::Reconnect {
                    break;
                }
            }
            // tungstenite queues the Pong reply itself.
            Message::Ping(_) => debug!("Ping from Slack"),
            Message::Close(frame) => {
                info!("Slack closed the WebSocket: {frame:?}");
                break;
            }
            _ => {}
        }
    }
    Ok(())
}

async fn handle_text<S>(text: &str, bot: &mut Bot, sink: &Mutex<S>) -> Flow
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin + Send,
{
    let frame = match parse_frame(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Unreadable Socket Mode frame: {e}");
            return Flow::Continue;
        }
    };

    match frame.kind.as_str() {
        "hello" => {
            info!("Socket Mode connection is ready");
            return Flow::Continue;
        }
        "disconnect" => {
            info!(
                "Slack requested a reconnect ({})",
                frame.reason.as_deref().unwrap_or("no reason")
            );
            return Flow::Reconnect;
        }
        _ => {}
    }

    let Some(envelope_id) = frame.envelope_id.as_deref() else {
        debug!("Ignoring {} frame without envelope id", frame.kind);
        return Flow::Continue;
    };

    let ack = EnvelopeAck::new(envelope_id, sink);
    // Events are acknowledged up front; commands and actions let the handler ack first.
    if frame.kind == "events_api" {
        ack.ack_or_log().await;
    }
    bot.handle_envelope(&frame.kind, frame.payload, &ack).await;
    ack.ack_or_log().await;

    Flow::Continue
}
