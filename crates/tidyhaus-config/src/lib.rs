//! Configuration for the tidyhaus CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `tidyhaus_core::BackendConfig`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tidyhaus_core::{BackendConfig, TlsMode, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no access token configured for profile '{profile}'")]
    NoToken { profile: String },

    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named Home Assistant profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by explicit name or fall back to the default.
    pub fn profile<'a>(
        &'a self,
        name: Option<&'a str>,
    ) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|p| (name, p))
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Re-enable disabled entities when a rename touches them.
    #[serde(default)]
    pub enable_disabled: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            enable_disabled: false,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named Home Assistant profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Instance base URL (e.g., "http://homeassistant.local:8123").
    pub url: String,

    /// Long-lived access token (plaintext — prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Path to the overrides file. Defaults to the platform data dir.
    pub overrides_path: Option<PathBuf>,
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
#[must_use]
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "tidyhaus", "tidyhaus").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the overrides file.
#[must_use]
pub fn default_overrides_path() -> PathBuf {
    ProjectDirs::from("com", "tidyhaus", "tidyhaus").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("overrides.json");
            p
        },
        |dirs| dirs.data_dir().join("overrides.json"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("tidyhaus");
    p
}

// ── Loading & saving ────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit path (tests and `--config` overrides).
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TIDYHAUS_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
#[must_use]
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the access token for a profile.
///
/// Chain: profile's `token_env` → `TIDYHAUS_TOKEN` → system keyring →
/// plaintext `token` in the config file.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(val) = std::env::var("TIDYHAUS_TOKEN") {
        return Ok(SecretString::from(val));
    }

    if let Ok(entry) = keyring::Entry::new("tidyhaus", &format!("{profile_name}/token")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoToken {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring for a profile.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new("tidyhaus", &format!("{profile_name}/token")).map_err(|e| {
        ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        }
    })?;
    entry.set_password(token).map_err(|e| ConfigError::Validation {
        field: "keyring".into(),
        reason: e.to_string(),
    })
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `BackendConfig` from a profile.
pub fn profile_to_backend_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<BackendConfig, ConfigError> {
    let base_url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;

    let token = resolve_token(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    Ok(BackendConfig {
        base_url,
        token,
        transport: TransportConfig {
            tls,
            timeout: Duration::from_secs(profile.timeout.unwrap_or(30)),
        },
    })
}

/// Resolve the overrides file path for a profile.
#[must_use]
pub fn overrides_path(profile: &Profile) -> PathBuf {
    profile
        .overrides_path
        .clone()
        .unwrap_or_else(default_overrides_path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn profile_lookup_falls_back_to_default() {
        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                url: "http://ha.local:8123".into(),
                ..Profile::default()
            },
        );
        let (name, _) = config.profile(None).unwrap();
        assert_eq!(name, "default");

        assert!(matches!(
            config.profile(Some("other")),
            Err(ConfigError::UnknownProfile(_))
        ));
    }

    #[test]
    fn load_config_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "home"

[defaults]
output = "json"

[profiles.home]
url = "http://homeassistant.local:8123"
token = "abc"
timeout = 10
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("home"));
        assert_eq!(config.defaults.output, "json");
        let (_, profile) = config.profile(Some("home")).unwrap();
        assert_eq!(profile.timeout, Some(10));
    }

    #[test]
    fn plaintext_token_is_last_resort() {
        let profile = Profile {
            url: "http://ha.local:8123".into(),
            token: Some("plaintext".into()),
            ..Profile::default()
        };
        let secret = resolve_token(&profile, "nonexistent-profile-for-tests").unwrap();
        use secrecy::ExposeSecret;
        assert_eq!(secret.expose_secret(), "plaintext");
    }

    #[test]
    fn backend_config_validates_url() {
        let profile = Profile {
            url: "not a url".into(),
            token: Some("t".into()),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_backend_config(&profile, "p"),
            Err(ConfigError::Validation { .. })
        ));
    }
}
