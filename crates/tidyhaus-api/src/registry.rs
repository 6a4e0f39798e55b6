//! WebSocket command client for the Home Assistant registries.
//!
//! The registry API is RPC-shaped: every command carries a monotonically
//! increasing `id`, and the backend answers with a `result` message
//! bearing the same id. This client owns the socket behind a mutex and
//! correlates responses by id; unrelated frames (event pushes, pings)
//! are handled inline while waiting.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{RawArea, RawDevice, RawEntityEntry};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ── Wire envelope ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Option<u64>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<CommandError>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommandError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

// ── Entity registry update payload ───────────────────────────────────

/// Fields for a `config/entity_registry/update` command.
///
/// `disabled_by` is a double option: `Some(None)` serializes an explicit
/// `null`, which is how the registry re-enables an entity.
#[derive(Debug, Default, Clone, Serialize)]
pub struct EntityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_entity_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_by: Option<Option<String>>,
}

// ── RegistryClient ───────────────────────────────────────────────────

/// Authenticated WebSocket session against `/api/websocket`.
///
/// Commands are strictly sequential — the socket mutex is held for the
/// full send/receive round trip, which matches the one-flow-per-request
/// model of the core (no interleaved registry writes).
pub struct RegistryClient {
    stream: Mutex<WsStream>,
    next_id: AtomicU64,
}

impl RegistryClient {
    /// Connect and run the auth handshake.
    ///
    /// `ws_url` is the full endpoint, e.g. `ws://host:8123/api/websocket`.
    pub async fn connect(ws_url: &Url, token: &SecretString) -> Result<Self, Error> {
        debug!(url = %ws_url, "connecting registry WebSocket");

        let (mut stream, _) = connect_async(ws_url.as_str())
            .await
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

        // Handshake: auth_required -> auth -> auth_ok | auth_invalid
        let first = recv_envelope(&mut stream).await?;
        if first.kind != "auth_required" {
            return Err(Error::WebSocketConnect(format!(
                "expected auth_required, got '{}'",
                first.kind
            )));
        }

        let auth = json!({ "type": "auth", "access_token": token.expose_secret() });
        send_json(&mut stream, &auth).await?;

        let reply = recv_envelope(&mut stream).await?;
        match reply.kind.as_str() {
            "auth_ok" => {}
            "auth_invalid" => {
                return Err(Error::Authentication {
                    message: reply
                        .message
                        .unwrap_or_else(|| "token rejected".to_owned()),
                });
            }
            other => {
                return Err(Error::WebSocketConnect(format!(
                    "unexpected handshake reply '{other}'"
                )));
            }
        }

        debug!("registry WebSocket authenticated");
        Ok(Self {
            stream: Mutex::new(stream),
            next_id: AtomicU64::new(1),
        })
    }

    /// Send one command and wait for its correlated result.
    async fn command(&self, kind: &str, fields: Value) -> Result<Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut payload = json!({ "id": id, "type": kind });
        if let (Some(obj), Some(extra)) = (payload.as_object_mut(), fields.as_object()) {
            for (k, v) in extra {
                obj.insert(k.clone(), v.clone());
            }
        }

        let mut stream = self.stream.lock().await;
        send_json(&mut stream, &payload).await?;

        loop {
            let env = recv_envelope(&mut stream).await?;
            if env.kind == "result" && env.id == Some(id) {
                return if env.success == Some(true) {
                    Ok(env.result.unwrap_or(Value::Null))
                } else {
                    let err = env.error.unwrap_or(CommandError {
                        code: "unknown".to_owned(),
                        message: "command failed".to_owned(),
                    });
                    Err(Error::CommandRejected {
                        code: err.code,
                        message: err.message,
                    })
                };
            }
            // Event pushes or stale results for other ids — skip.
            trace!(kind = %env.kind, id = ?env.id, "skipping unrelated frame");
        }
    }

    // ── Registry list commands ───────────────────────────────────────

    /// `config/area_registry/list`
    pub async fn list_areas(&self) -> Result<Vec<RawArea>, Error> {
        let result = self.command("config/area_registry/list", json!({})).await?;
        parse_result(result)
    }

    /// `config/device_registry/list`
    pub async fn list_devices(&self) -> Result<Vec<RawDevice>, Error> {
        let result = self
            .command("config/device_registry/list", json!({}))
            .await?;
        parse_result(result)
    }

    /// `config/entity_registry/list`
    pub async fn list_entities(&self) -> Result<Vec<RawEntityEntry>, Error> {
        let result = self
            .command("config/entity_registry/list", json!({}))
            .await?;
        parse_result(result)
    }

    // ── Registry mutation commands ───────────────────────────────────

    /// `config/entity_registry/update` for the given entity.
    pub async fn update_entity(&self, entity_id: &str, update: &EntityUpdate) -> Result<(), Error> {
        let mut fields = serde_json::to_value(update).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::new(),
        })?;
        if let Some(obj) = fields.as_object_mut() {
            obj.insert("entity_id".to_owned(), Value::String(entity_id.to_owned()));
        }
        self.command("config/entity_registry/update", fields)
            .await?;
        Ok(())
    }

    /// `config/device_registry/update` setting the user-facing device name.
    pub async fn rename_device(&self, device_id: &str, name: &str) -> Result<(), Error> {
        self.command(
            "config/device_registry/update",
            json!({ "device_id": device_id, "name_by_user": name }),
        )
        .await?;
        Ok(())
    }

    /// Close the session.
    pub async fn close(&self) -> Result<(), Error> {
        let mut stream = self.stream.lock().await;
        stream
            .close(None)
            .await
            .map_err(|e| Error::WebSocketClosed {
                reason: e.to_string(),
            })
    }
}

// ── Socket helpers ───────────────────────────────────────────────────

async fn send_json(stream: &mut WsStream, payload: &Value) -> Result<(), Error> {
    let body = payload.to_string();
    trace!(%body, "ws send");
    stream
        .send(Message::Text(body.into()))
        .await
        .map_err(|e| Error::WebSocketClosed {
            reason: e.to_string(),
        })
}

/// Read frames until a parseable text envelope arrives.
///
/// Pings are answered inline; a close frame or stream end surfaces as
/// [`Error::WebSocketClosed`].
async fn recv_envelope(stream: &mut WsStream) -> Result<Envelope, Error> {
    loop {
        let msg = stream
            .next()
            .await
            .ok_or_else(|| Error::WebSocketClosed {
                reason: "stream ended".to_owned(),
            })?
            .map_err(|e| Error::WebSocketClosed {
                reason: e.to_string(),
            })?;

        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).map_err(|e| Error::Deserialization {
                    message: e.to_string(),
                    body: text.to_string(),
                });
            }
            Message::Ping(data) => {
                stream
                    .send(Message::Pong(data))
                    .await
                    .map_err(|e| Error::WebSocketClosed {
                        reason: e.to_string(),
                    })?;
            }
            Message::Close(frame) => {
                return Err(Error::WebSocketClosed {
                    reason: frame
                        .map(|f| f.reason.to_string())
                        .unwrap_or_else(|| "closed by peer".to_owned()),
                });
            }
            _ => {}
        }
    }
}

fn parse_result<T: serde::de::DeserializeOwned>(result: Value) -> Result<T, Error> {
    serde_json::from_value(result.clone()).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: result.to_string(),
    })
}
