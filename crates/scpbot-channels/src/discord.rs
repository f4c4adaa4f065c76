//! Discord channel — gateway websocket for receiving, REST for sending.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::Stream;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use scpbot_core::config::DiscordConfig;
use scpbot_core::error::{Result, ScpBotError};
use scpbot_core::traits::Channel;
use scpbot_core::types::{IncomingMessage, OutgoingMessage};

const API_URL: &str = "https://discord.com/api/v10";

/// GUILDS | GUILD_MESSAGES | DIRECT_MESSAGES | MESSAGE_CONTENT
const INTENTS: u64 = 1 | (1 << 9) | (1 << 12) | (1 << 15);

/// Gateway opcodes we react to.
const OP_DISPATCH: u64 = 0;
const OP_HEARTBEAT: u64 = 1;
const OP_RECONNECT: u64 = 7;
const OP_INVALID_SESSION: u64 = 9;
const OP_HELLO: u64 = 10;

/// Discord bot channel.
pub struct DiscordChannel {
    config: DiscordConfig,
    client: reqwest::Client,
    token: String,
    connected: bool,
}

impl DiscordChannel {
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            token: String::new(),
            connected: false,
        }
    }

    /// Get the bot's own user record.
    pub async fn get_me(&self) -> Result<DiscordUser> {
        let response = self
            .client
            .get(format!("{API_URL}/users/@me"))
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await
            .map_err(|e| ScpBotError::Channel(format!("getMe failed: {e}")))?;
        if !response.status().is_success() {
            return Err(ScpBotError::Channel(format!(
                "getMe failed: HTTP {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| ScpBotError::Channel(format!("Invalid getMe response: {e}")))
    }

    /// Send a text message into a channel.
    pub async fn send_message(&self, channel_id: &str, content: &str) -> Result<()> {
        let body = serde_json::json!({ "content": content });
        let response = self
            .client
            .post(format!("{API_URL}/channels/{channel_id}/messages"))
            .header("Authorization", format!("Bot {}", self.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| ScpBotError::Channel(format!("sendMessage failed: {e}")))?;
        if !response.status().is_success() {
            return Err(ScpBotError::Channel(format!(
                "Send failed: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Start the gateway loop — returns a stream of IncomingMessages.
    ///
    /// Call after `connect`. The spawned task reconnects with a backoff
    /// until the returned stream is dropped; the channel itself stays
    /// usable for sending.
    pub fn start_listening(&self) -> DiscordEventStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let client = self.client.clone();
        let token = self.token.clone();

        tokio::spawn(async move {
            tracing::info!("Discord gateway loop started");
            loop {
                match run_session(&client, &token, &tx).await {
                    Ok(()) => tracing::info!("Discord gateway session ended, reconnecting"),
                    Err(e) => tracing::error!("Discord gateway error: {e}"),
                }
                if tx.is_closed() {
                    tracing::info!("Discord gateway stopped (receiver dropped)");
                    return;
                }
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        });

        DiscordEventStream { rx }
    }
}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn connect(&mut self) -> Result<()> {
        self.token = self.config.resolve_token()?;
        let me = self.get_me().await?;
        tracing::info!("Discord bot: {} ({})", me.username, me.id);
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        self.send_message(&message.thread_id, &message.content).await
    }

    async fn listen(&self) -> Result<Box<dyn Stream<Item = IncomingMessage> + Send + Unpin>> {
        // The gateway needs a background task that owns the socket; use
        // start_listening(), which consumes self.
        Ok(Box::new(futures::stream::pending()))
    }
}

/// Stream of incoming Discord messages from the gateway task.
pub struct DiscordEventStream {
    rx: tokio::sync::mpsc::UnboundedReceiver<IncomingMessage>,
}

impl Stream for DiscordEventStream {
    type Item = IncomingMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Unpin for DiscordEventStream {}

/// One gateway session: connect, identify, heartbeat, pump dispatches.
/// Returns Ok on an orderly close (caller reconnects).
async fn run_session(
    client: &reqwest::Client,
    token: &str,
    tx: &tokio::sync::mpsc::UnboundedSender<IncomingMessage>,
) -> Result<()> {
    let gateway = gateway_url(client, token).await?;
    let (ws, _response) = tokio_tungstenite::connect_async(&gateway)
        .await
        .map_err(|e| ScpBotError::Channel(format!("Gateway connect failed: {e}")))?;
    tracing::info!("Discord gateway connected");
    let (mut write, mut read) = ws.split();

    // HELLO arrives first and carries the heartbeat interval.
    let hello = loop {
        match next_payload(&mut read).await? {
            Some(p) if p.op == OP_HELLO => break p,
            Some(p) => tracing::debug!("Pre-hello payload (op {})", p.op),
            None => return Ok(()),
        }
    };
    let interval_ms = hello.d["heartbeat_interval"].as_u64().unwrap_or(41_250);

    let identify = serde_json::json!({
        "op": 2,
        "d": {
            "token": token,
            "intents": INTENTS,
            "properties": { "os": "linux", "browser": "scpbot", "device": "scpbot" },
        }
    });
    send_json(&mut write, &identify).await?;

    let mut heartbeat = tokio::time::interval(Duration::from_millis(interval_ms));
    let mut last_seq: Option<u64> = None;
    let mut own_id = String::new();

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                send_json(&mut write, &serde_json::json!({ "op": 1, "d": last_seq })).await?;
            }
            payload = next_payload(&mut read) => {
                let Some(payload) = payload? else {
                    tracing::info!("Discord gateway closed");
                    return Ok(());
                };
                if let Some(seq) = payload.s {
                    last_seq = Some(seq);
                }
                match payload.op {
                    OP_DISPATCH => match payload.t.as_deref() {
                        Some("READY") => {
                            own_id = payload.d["user"]["id"].as_str().unwrap_or("").to_string();
                            tracing::info!("Discord session ready");
                        }
                        Some("MESSAGE_CREATE") => {
                            if let Some(msg) = parse_message(&payload.d, &own_id)
                                && tx.send(msg).is_err()
                            {
                                return Ok(());
                            }
                        }
                        _ => {}
                    },
                    OP_HEARTBEAT => {
                        send_json(&mut write, &serde_json::json!({ "op": 1, "d": last_seq })).await?;
                    }
                    OP_RECONNECT | OP_INVALID_SESSION => {
                        tracing::info!("Discord gateway asked for a reconnect (op {})", payload.op);
                        return Ok(());
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Ask the REST API for the websocket URL.
async fn gateway_url(client: &reqwest::Client, token: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct Gateway {
        url: String,
    }
    let gateway: Gateway = client
        .get(format!("{API_URL}/gateway/bot"))
        .header("Authorization", format!("Bot {token}"))
        .send()
        .await
        .map_err(|e| ScpBotError::Channel(format!("Gateway lookup failed: {e}")))?
        .json()
        .await
        .map_err(|e| ScpBotError::Channel(format!("Invalid gateway response: {e}")))?;
    Ok(format!("{}/?v=10&encoding=json", gateway.url))
}

type WsWrite = futures::stream::SplitSink<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    WsMessage,
>;
type WsRead = futures::stream::SplitStream<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
>;

async fn send_json(write: &mut WsWrite, payload: &serde_json::Value) -> Result<()> {
    write
        .send(WsMessage::Text(payload.to_string()))
        .await
        .map_err(|e| ScpBotError::Channel(format!("Gateway send failed: {e}")))
}

/// Next parseable text payload; `Ok(None)` when the socket closed.
async fn next_payload(read: &mut WsRead) -> Result<Option<GatewayPayload>> {
    while let Some(msg) = read.next().await {
        match msg {
            Ok(WsMessage::Text(text)) => match serde_json::from_str(&text) {
                Ok(payload) => return Ok(Some(payload)),
                Err(e) => tracing::warn!("Unparseable gateway payload: {e}"),
            },
            Ok(WsMessage::Close(frame)) => {
                tracing::info!("Discord gateway close frame: {frame:?}");
                return Ok(None);
            }
            Ok(_) => {}
            Err(e) => {
                return Err(ScpBotError::Channel(format!("Gateway read failed: {e}")));
            }
        }
    }
    Ok(None)
}

#[derive(Debug, Deserialize)]
struct GatewayPayload {
    op: u64,
    #[serde(default)]
    d: serde_json::Value,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

/// Map a MESSAGE_CREATE dispatch to an IncomingMessage.
fn parse_message(d: &serde_json::Value, own_id: &str) -> Option<IncomingMessage> {
    let content = d["content"].as_str()?;
    let mentioned_me = !own_id.is_empty()
        && d["mentions"]
            .as_array()
            .is_some_and(|users| users.iter().any(|u| u["id"].as_str() == Some(own_id)));
    Some(IncomingMessage {
        channel: "discord".into(),
        thread_id: d["channel_id"].as_str().unwrap_or("").into(),
        sender_id: d["author"]["id"].as_str().unwrap_or("").into(),
        sender_name: d["author"]["username"].as_str().map(String::from),
        content: content.into(),
        sender_is_bot: d["author"]["bot"].as_bool().unwrap_or(false),
        mentioned_me,
        timestamp: chrono::Utc::now(),
    })
}

/// Discord user record (the fields we read).
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_create() {
        let d = serde_json::json!({
            "channel_id": "123",
            "content": "scp-173 please",
            "author": { "id": "42", "username": "reader", "bot": false },
            "mentions": [],
        });
        let msg = parse_message(&d, "99").unwrap();
        assert_eq!(msg.channel, "discord");
        assert_eq!(msg.thread_id, "123");
        assert_eq!(msg.sender_id, "42");
        assert_eq!(msg.sender_name.as_deref(), Some("reader"));
        assert_eq!(msg.content, "scp-173 please");
        assert!(!msg.sender_is_bot);
        assert!(!msg.mentioned_me);
    }

    #[test]
    fn test_parse_message_flags_bots_and_mentions() {
        let d = serde_json::json!({
            "channel_id": "123",
            "content": "hello",
            "author": { "id": "7", "username": "other-bot", "bot": true },
            "mentions": [ { "id": "99" } ],
        });
        let msg = parse_message(&d, "99").unwrap();
        assert!(msg.sender_is_bot);
        assert!(msg.mentioned_me);
    }

    #[test]
    fn test_parse_message_without_content_is_skipped() {
        let d = serde_json::json!({ "channel_id": "123" });
        assert!(parse_message(&d, "99").is_none());
    }

    #[test]
    fn test_gateway_payload_shapes() {
        let hello: GatewayPayload =
            serde_json::from_str(r#"{"op":10,"d":{"heartbeat_interval":41250}}"#).unwrap();
        assert_eq!(hello.op, OP_HELLO);
        assert_eq!(hello.d["heartbeat_interval"].as_u64(), Some(41250));
        assert!(hello.s.is_none());

        let dispatch: GatewayPayload =
            serde_json::from_str(r#"{"op":0,"t":"MESSAGE_CREATE","s":3,"d":{}}"#).unwrap();
        assert_eq!(dispatch.op, OP_DISPATCH);
        assert_eq!(dispatch.s, Some(3));
        assert_eq!(dispatch.t.as_deref(), Some("MESSAGE_CREATE"));
    }

    #[test]
    fn test_message_content_intent_is_set() {
        assert_eq!(INTENTS & (1 << 15), 1 << 15);
        assert_eq!(INTENTS & (1 << 9), 1 << 9);
    }
}
