// REST API HTTP client
//
// Wraps `reqwest::Client` with Home-Assistant-specific URL construction
// and bearer-token auth. Returns raw payloads; status handling is
// centralized in the request helpers so endpoint methods stay one-liners.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::RawState;
use crate::transport::TransportConfig;

/// Raw HTTP client for the Home Assistant REST API.
///
/// Serves two jobs for the core: the read-only state dump
/// (`/api/states`) and the persisted scene/script/automation
/// configurations under `/api/config/...` (read and write).
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

impl RestClient {
    /// Create a new REST client from a `TransportConfig`.
    ///
    /// `base_url` is the instance root, e.g. `http://homeassistant.local:8123`
    /// or `http://supervisor/core` in add-on mode.
    pub fn new(base_url: Url, token: SecretString, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url, token })
    }

    /// Create a REST client with a pre-built `reqwest::Client` (tests).
    pub fn with_client(http: reqwest::Client, base_url: Url, token: SecretString) -> Self {
        Self { http, base_url, token }
    }

    /// The instance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an `/api/{path}` endpoint.
    fn api_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/api/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        );
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and deserialize the JSON body.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Send a POST request with a JSON body and deserialize the response.
    async fn post<T: DeserializeOwned>(&self, url: Url, body: &impl Serialize) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .bearer_auth(self.token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Map non-success statuses to errors, then deserialize.
    async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::Authentication {
                message: format!("REST API rejected the token (HTTP {})", status.as_u16()),
            });
        }
        if !status.is_success() {
            return Err(Error::RestApi {
                message: body,
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch all entity states: `GET /api/states`.
    pub async fn get_states(&self) -> Result<Vec<RawState>, Error> {
        self.get(self.api_url("states")?).await
    }

    /// Fetch one automation's persisted configuration.
    ///
    /// Returns `Ok(None)` on 404 — the automation exists only in YAML
    /// (not editable through the config API).
    pub async fn get_automation_config(&self, automation_id: &str) -> Result<Option<Value>, Error> {
        let url = self.api_url(&format!("config/automation/config/{automation_id}"))?;
        match self.get(url).await {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Overwrite one automation's persisted configuration.
    pub async fn update_automation_config(
        &self,
        automation_id: &str,
        config: &Value,
    ) -> Result<(), Error> {
        let url = self.api_url(&format!("config/automation/config/{automation_id}"))?;
        let _: Value = self.post(url, config).await?;
        Ok(())
    }

    /// Fetch one scene's persisted configuration (`None` on 404).
    pub async fn get_scene_config(&self, scene_id: &str) -> Result<Option<Value>, Error> {
        let url = self.api_url(&format!("config/scene/config/{scene_id}"))?;
        match self.get(url).await {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Overwrite one scene's persisted configuration.
    pub async fn update_scene_config(&self, scene_id: &str, config: &Value) -> Result<(), Error> {
        let url = self.api_url(&format!("config/scene/config/{scene_id}"))?;
        let _: Value = self.post(url, config).await?;
        Ok(())
    }

    /// Fetch one script's persisted configuration by object id (`None` on 404).
    pub async fn get_script_config(&self, object_id: &str) -> Result<Option<Value>, Error> {
        let url = self.api_url(&format!("config/script/config/{object_id}"))?;
        match self.get(url).await {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Overwrite one script's persisted configuration.
    pub async fn update_script_config(&self, object_id: &str, config: &Value) -> Result<(), Error> {
        let url = self.api_url(&format!("config/script/config/{object_id}"))?;
        let _: Value = self.post(url, config).await?;
        Ok(())
    }
}
