//! Websocket URLs and message protocols for the live game channels.
//!
//! SYSTEM CONTEXT
//! ==============
//! Three channels exist: character chat (`/ws/character/{user}/{character}`),
//! mystery-event chat (`/ws/event/{user}/{event}`), and the werewolf room
//! (`/ws/werewolf/{room}/{user}`). All carry JSON text frames. Chat channels
//! take `{"message": ...}`; the werewolf channel takes `action`/`message`
//! frames and pushes room state.
//!
//! ERROR HANDLING
//! ==============
//! The backend reports failures as a bare `{"error": ...}` object with no
//! `type`; those decode to an `Error` variant rather than a transport error.

#[cfg(test)]
#[path = "socket_test.rs"]
mod socket_test;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::types::GameRoom;
use crate::error::ApiError;

// =============================================================================
// URLS
// =============================================================================

/// Map the REST base URL to a websocket URL under `/ws`.
///
/// `http` becomes `ws`, `https` becomes `wss`, and a trailing `/api` path
/// segment is dropped since sockets are mounted beside the REST prefix.
///
/// # Errors
///
/// Returns an error if `base_url` is not an absolute `http(s)` URL.
pub fn socket_url(base_url: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let invalid = || ApiError::InvalidBaseUrl(base_url.to_owned());
    let mut url = Url::parse(base_url).map_err(|_| invalid())?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        _ => return Err(invalid()),
    };
    url.set_scheme(scheme).map_err(|()| invalid())?;
    url.set_query(None);
    url.set_fragment(None);

    let mut prefix: Vec<String> = url
        .path_segments()
        .map(|parts| parts.filter(|p| !p.is_empty()).map(str::to_owned).collect())
        .unwrap_or_default();
    if prefix.last().is_some_and(|p| p == "api") {
        prefix.pop();
    }
    url.path_segments_mut()
        .map_err(|()| invalid())?
        .clear()
        .extend(&prefix)
        .push("ws")
        .extend(segments);
    Ok(url)
}

/// `/ws/character/{userId}/{characterId}`
///
/// # Errors
///
/// See [`socket_url`].
pub fn character_chat_url(base_url: &str, user_id: &str, character_id: &str) -> Result<Url, ApiError> {
    socket_url(base_url, &["character", user_id, character_id])
}

/// `/ws/event/{userId}/{eventId}`
///
/// # Errors
///
/// See [`socket_url`].
pub fn event_chat_url(base_url: &str, user_id: &str, event_id: &str) -> Result<Url, ApiError> {
    socket_url(base_url, &["event", user_id, event_id])
}

/// `/ws/werewolf/{roomId}/{userId}`
///
/// # Errors
///
/// See [`socket_url`].
pub fn werewolf_url(base_url: &str, room_id: &str, user_id: &str) -> Result<Url, ApiError> {
    socket_url(base_url, &["werewolf", room_id, user_id])
}

// =============================================================================
// MESSAGES
// =============================================================================

/// Frame sent on a character or event chat channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Frame received on a character or event chat channel.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatReply {
    /// Reply text, with the speaking character's name on character channels.
    Message { content: String, character: Option<String> },
    /// Event background, sent once when an event channel opens.
    Background { content: String },
    Error(String),
    Other(Value),
}

impl ChatReply {
    /// Decode one text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is not JSON.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        if let Some(message) = error_field(&value) {
            return Ok(Self::Error(message));
        }
        let content = string_field(&value, "content");
        Ok(match value.get("type").and_then(Value::as_str) {
            Some("message") => Self::Message {
                content: content.unwrap_or_default(),
                character: string_field(&value, "character"),
            },
            Some("background") => Self::Background { content: content.unwrap_or_default() },
            _ => Self::Other(value),
        })
    }
}

/// Frame sent on the werewolf channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WerewolfRequest {
    /// Night or vote action (`kill`, `check`, `save`, `poison`, `guard`, `vote`, ...).
    Action {
        action: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    /// Daytime speech.
    Message { content: String },
}

/// Frame received on the werewolf channel.
#[derive(Clone, Debug, PartialEq)]
pub enum WerewolfEvent {
    /// Snapshot sent right after connecting.
    RoomState(Box<GameRoom>),
    /// Snapshot broadcast after any player acts.
    RoomUpdate(Box<GameRoom>),
    PrivateMessage(Value),
    PublicMessage(Value),
    Error(String),
    /// Direct reply to an action, or anything unrecognized.
    Other(Value),
}

impl WerewolfEvent {
    /// Decode one text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is not JSON or a room snapshot does not
    /// match [`GameRoom`].
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let mut value: Value = serde_json::from_str(raw)?;
        if let Some(message) = error_field(&value) {
            return Ok(Self::Error(message));
        }
        let kind = value.get("type").and_then(Value::as_str).map(str::to_owned);
        Ok(match kind.as_deref() {
            Some("room_state") => Self::RoomState(Box::new(serde_json::from_value(take(&mut value, "room"))?)),
            Some("room_update") => Self::RoomUpdate(Box::new(serde_json::from_value(take(&mut value, "room"))?)),
            Some("private_message") => Self::PrivateMessage(take(&mut value, "content")),
            Some("public_message") => Self::PublicMessage(take(&mut value, "content")),
            _ => Self::Other(value),
        })
    }

    /// Room snapshot carried by this frame, if any.
    pub fn room(&self) -> Option<&GameRoom> {
        match self {
            Self::RoomState(room) | Self::RoomUpdate(room) => Some(room.as_ref()),
            _ => None,
        }
    }
}

fn error_field(value: &Value) -> Option<String> {
    if value.get("type").is_some() {
        return None;
    }
    string_field(value, "error")
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn take(value: &mut Value, key: &str) -> Value {
    value.get_mut(key).map(Value::take).unwrap_or_default()
}

// =============================================================================
// CONNECTION
// =============================================================================

/// One open websocket channel carrying JSON text frames.
pub struct PartySocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl PartySocket {
    /// Open the channel at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handshake fails.
    pub async fn connect(url: &Url) -> Result<Self, ApiError> {
        tracing::debug!(%url, "websocket connect");
        let (stream, _) = connect_async(url.as_str()).await?;
        Ok(Self { stream })
    }

    /// Send `frame` as a JSON text message.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the send fails.
    pub async fn send<T: Serialize>(&mut self, frame: &T) -> Result<(), ApiError> {
        let raw = serde_json::to_string(frame)?;
        self.stream.send(Message::Text(raw.into())).await?;
        Ok(())
    }

    /// Wait up to `wait` for the next text frame. Pings, pongs, and binary
    /// frames are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, close, or transport failure.
    pub async fn next_text(&mut self, wait: Duration) -> Result<String, ApiError> {
        let fut = async {
            loop {
                let Some(message) = self.stream.next().await else {
                    return Err(ApiError::SocketClosed);
                };
                match message? {
                    Message::Text(text) => return Ok(text.as_str().to_owned()),
                    Message::Close(_) => return Err(ApiError::SocketClosed),
                    _ => {}
                }
            }
        };

        tokio::time::timeout(wait, fut).await.map_err(|_| ApiError::Timeout)?
    }

    /// Wait for the next werewolf-channel frame.
    ///
    /// # Errors
    ///
    /// See [`PartySocket::next_text`]; also fails on undecodable frames.
    pub async fn next_werewolf(&mut self, wait: Duration) -> Result<WerewolfEvent, ApiError> {
        let raw = self.next_text(wait).await?;
        Ok(WerewolfEvent::parse(&raw)?)
    }

    /// Wait for the next chat-channel frame.
    ///
    /// # Errors
    ///
    /// See [`PartySocket::next_text`]; also fails on non-JSON frames.
    pub async fn next_chat(&mut self, wait: Duration) -> Result<ChatReply, ApiError> {
        let raw = self.next_text(wait).await?;
        Ok(ChatReply::parse(&raw)?)
    }

    /// Close the channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake fails.
    pub async fn close(mut self) -> Result<(), ApiError> {
        self.stream.close(None).await?;
        Ok(())
    }
}
