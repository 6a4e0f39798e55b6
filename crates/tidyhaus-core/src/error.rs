// ── Core error types ──
//
// User-facing errors from tidyhaus-core. These are NOT API-specific --
// consumers never see HTTP status codes or WebSocket frames directly.
// The `From<tidyhaus_api::Error>` impl translates transport-layer
// errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation / lookup ──────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Preview not found: {preview_id}")]
    PreviewNotFound { preview_id: String },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Mutation errors (caught per item during execute) ─────────────
    #[error("Registry mutation failed for {target}: {message}")]
    RegistryMutation { target: String, message: String },

    // ── Connection / backend ─────────────────────────────────────────
    #[error("Cannot connect to backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Backend API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Persistence / configuration ──────────────────────────────────
    #[error("Override store error: {message}")]
    OverrideStore { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<tidyhaus_api::Error> for CoreError {
    fn from(err: tidyhaus_api::Error) -> Self {
        match err {
            tidyhaus_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            tidyhaus_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            tidyhaus_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            tidyhaus_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            tidyhaus_api::Error::RestApi { message, status } => CoreError::Api {
                message,
                status: Some(status),
            },
            tidyhaus_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            tidyhaus_api::Error::WebSocketClosed { reason } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket closed: {reason}"),
            },
            tidyhaus_api::Error::CommandRejected { code, message } => CoreError::Api {
                message: format!("registry command rejected ({code}): {message}"),
                status: None,
            },
            tidyhaus_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
