use thiserror::Error;

/// Top-level error type for the `tidyhaus-api` crate.
///
/// Covers every failure mode across both API surfaces: authentication,
/// HTTP transport, REST status errors, WebSocket lifecycle, and command
/// rejection. `tidyhaus-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token rejected during the WebSocket auth handshake or a 401 from REST.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── REST API ────────────────────────────────────────────────────
    /// Non-success HTTP status from the REST API.
    #[error("REST API error (HTTP {status}): {message}")]
    RestApi { message: String, status: u16 },

    // ── WebSocket / registry ────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket closed while a command was in flight.
    #[error("WebSocket closed: {reason}")]
    WebSocketClosed { reason: String },

    /// A registry command came back with `success: false`.
    #[error("Registry command rejected ({code}): {message}")]
    CommandRejected { code: String, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::RestApi { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates the token was rejected.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::RestApi { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}
