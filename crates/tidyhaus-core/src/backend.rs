//! The backend collaborator interface.
//!
//! [`Backend`] is the seam between the engine and the home-automation
//! instance: reads come back as domain types, writes are the handful of
//! registry and config mutations the engine performs.
//! [`HomeAssistantBackend`] composes the `tidyhaus-api` REST and
//! registry clients; tests substitute an in-memory fake.

use secrecy::SecretString;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use tidyhaus_api::{EntityUpdate, RegistryClient, RestClient, TransportConfig};

use crate::error::CoreError;
use crate::model::{Area, Device, Entity, ReferenceKind, State};

/// Full registry dump, fetched in one go per snapshot.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    pub areas: Vec<Area>,
    pub devices: Vec<Device>,
    pub entities: Vec<Entity>,
}

/// One entity registry mutation. Unset fields are left untouched;
/// `enable` clears the disabled flag alongside the other changes.
#[derive(Debug, Clone, Default)]
pub struct EntityChange {
    pub new_entity_id: Option<String>,
    pub name: Option<String>,
    pub enable: bool,
}

pub trait Backend: Send + Sync {
    async fn states(&self) -> Result<Vec<State>, CoreError>;

    async fn structure(&self) -> Result<Structure, CoreError>;

    async fn update_entity(&self, entity_id: &str, change: &EntityChange)
    -> Result<(), CoreError>;

    /// Replace the entity's label list (the registry takes the full
    /// list, not a delta).
    async fn set_labels(&self, entity_id: &str, labels: Vec<String>) -> Result<(), CoreError>;

    /// Set the user-facing device name. `Ok(false)` when the backend
    /// rejects the rename (stale device, unchanged name).
    async fn rename_device(&self, device_id: &str, name: &str) -> Result<bool, CoreError>;

    /// Fetch a stored config. `Ok(None)` when the config is not managed
    /// through the config API (YAML-defined).
    async fn get_config(
        &self,
        kind: ReferenceKind,
        config_id: &str,
    ) -> Result<Option<Value>, CoreError>;

    async fn update_config(
        &self,
        kind: ReferenceKind,
        config_id: &str,
        config: &Value,
    ) -> Result<(), CoreError>;
}

// ── Home Assistant implementation ───────────────────────────────────

/// Connection parameters for a Home Assistant instance.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// HTTP base, e.g. `http://homeassistant.local:8123`.
    pub base_url: Url,
    pub token: SecretString,
    pub transport: TransportConfig,
}

impl BackendConfig {
    /// Derive the WebSocket endpoint from the HTTP base.
    pub fn ws_url(&self) -> Result<Url, CoreError> {
        let mut url = self.base_url.clone();
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme).map_err(|()| CoreError::Config {
            message: format!("cannot derive WebSocket scheme from {}", self.base_url),
        })?;
        url.set_path("/api/websocket");
        Ok(url)
    }
}

pub struct HomeAssistantBackend {
    rest: RestClient,
    registry: RegistryClient,
}

impl HomeAssistantBackend {
    /// Connect both transports and authenticate the WebSocket session.
    pub async fn connect(config: &BackendConfig) -> Result<Self, CoreError> {
        let http = config.transport.build_client()?;
        let rest = RestClient::with_client(http, config.base_url.clone(), config.token.clone());

        let ws_url = config.ws_url()?;
        let registry = RegistryClient::connect(&ws_url, &config.token).await?;

        Ok(Self { rest, registry })
    }

    pub async fn close(&self) {
        if let Err(e) = self.registry.close().await {
            debug!(error = %e, "registry close failed");
        }
    }
}

impl Backend for HomeAssistantBackend {
    async fn states(&self) -> Result<Vec<State>, CoreError> {
        let raw = self.rest.get_states().await?;
        Ok(raw.into_iter().map(State::from).collect())
    }

    async fn structure(&self) -> Result<Structure, CoreError> {
        let areas = self.registry.list_areas().await?;
        let devices = self.registry.list_devices().await?;
        let entities = self.registry.list_entities().await?;
        debug!(
            areas = areas.len(),
            devices = devices.len(),
            entities = entities.len(),
            "fetched registry structure"
        );
        Ok(Structure {
            areas: areas.into_iter().map(Area::from).collect(),
            devices: devices.into_iter().map(Device::from).collect(),
            entities: entities.into_iter().map(Entity::from).collect(),
        })
    }

    async fn update_entity(
        &self,
        entity_id: &str,
        change: &EntityChange,
    ) -> Result<(), CoreError> {
        let update = EntityUpdate {
            new_entity_id: change.new_entity_id.clone(),
            name: change.name.clone(),
            labels: None,
            disabled_by: change.enable.then_some(None),
        };
        self.registry
            .update_entity(entity_id, &update)
            .await
            .map_err(CoreError::from)
    }

    async fn set_labels(&self, entity_id: &str, labels: Vec<String>) -> Result<(), CoreError> {
        let update = EntityUpdate {
            labels: Some(labels),
            ..EntityUpdate::default()
        };
        self.registry
            .update_entity(entity_id, &update)
            .await
            .map_err(CoreError::from)
    }

    async fn rename_device(&self, device_id: &str, name: &str) -> Result<bool, CoreError> {
        match self.registry.rename_device(device_id, name).await {
            Ok(()) => Ok(true),
            Err(tidyhaus_api::Error::CommandRejected { code, message }) => {
                warn!(device_id, code, message, "device rename rejected");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_config(
        &self,
        kind: ReferenceKind,
        config_id: &str,
    ) -> Result<Option<Value>, CoreError> {
        let config = match kind {
            ReferenceKind::Scene => self.rest.get_scene_config(config_id).await?,
            ReferenceKind::Script => self.rest.get_script_config(config_id).await?,
            ReferenceKind::Automation => self.rest.get_automation_config(config_id).await?,
            ReferenceKind::Group => None,
        };
        Ok(config)
    }

    async fn update_config(
        &self,
        kind: ReferenceKind,
        config_id: &str,
        config: &Value,
    ) -> Result<(), CoreError> {
        match kind {
            ReferenceKind::Scene => self.rest.update_scene_config(config_id, config).await?,
            ReferenceKind::Script => self.rest.update_script_config(config_id, config).await?,
            ReferenceKind::Automation => {
                self.rest.update_automation_config(config_id, config).await?;
            }
            ReferenceKind::Group => {
                return Err(CoreError::validation(
                    "group membership is YAML-managed and cannot be rewritten",
                ));
            }
        }
        Ok(())
    }
}
