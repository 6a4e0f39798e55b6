//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use tidyhaus_config::ConfigError;
use tidyhaus_core::CoreError;

/// Exit codes, stable across releases for scripting.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Home Assistant: {reason}")]
    #[diagnostic(
        code(tidyhaus::connection_failed),
        help(
            "Check that the instance is reachable and the URL is correct.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(tidyhaus::auth_failed),
        help(
            "Verify the long-lived access token.\n\
             Create one under your Home Assistant profile page, then run:\n\
             tidyhaus config set-token"
        )
    )]
    AuthFailed { message: String },

    #[error("No access token configured for profile '{profile}'")]
    #[diagnostic(
        code(tidyhaus::no_token),
        help(
            "Store a token with: tidyhaus config set-token\n\
             Or set the TIDYHAUS_TOKEN environment variable."
        )
    )]
    NoToken { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(tidyhaus::not_found))]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("Preview '{preview_id}' not found or already executed")]
    #[diagnostic(
        code(tidyhaus::preview_not_found),
        help("Previews are single-use. Run the preview again to build a fresh plan.")
    )]
    PreviewNotFound { preview_id: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Backend error: {message}")]
    #[diagnostic(code(tidyhaus::api_error))]
    Api { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tidyhaus::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(tidyhaus::profile_not_found),
        help("Create one with: tidyhaus config init")
    )]
    ProfileNotFound { name: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(tidyhaus::no_config),
        help(
            "Create one with: tidyhaus config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(tidyhaus::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(tidyhaus::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(tidyhaus::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoToken { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::PreviewNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError ─────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::PreviewNotFound { preview_id } => CliError::PreviewNotFound { preview_id },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                resource_type: entity_type,
                identifier,
            },

            CoreError::RegistryMutation { target, message } => CliError::Api {
                message: format!("{target}: {message}"),
            },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Api { message, status } => CliError::Api {
                message: match status {
                    Some(status) => format!("{message} (HTTP {status})"),
                    None => message,
                },
            },

            CoreError::OverrideStore { message } | CoreError::Config { message } => {
                CliError::Config { message }
            }

            CoreError::Internal(message) => CliError::Api { message },
        }
    }
}

// ── ConfigError → CliError ───────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoToken { profile } => CliError::NoToken { profile },
            ConfigError::UnknownProfile(name) => CliError::ProfileNotFound { name },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
