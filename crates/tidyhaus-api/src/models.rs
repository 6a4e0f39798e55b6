//! Raw wire payloads from Home Assistant.
//!
//! These mirror what the backend actually sends. `#[serde(flatten)]`
//! captures all fields beyond the core set, so nothing is silently
//! dropped — the dependency scanner in `tidyhaus-core` relies on the
//! full attribute payload being available.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── REST: /api/states ────────────────────────────────────────────────

/// One entry from `GET /api/states`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawState {
    pub entity_id: String,

    /// Current state value, e.g. `"on"`, `"23.5"`, `"unavailable"`.
    #[serde(default)]
    pub state: String,

    /// Full attribute payload. Kept as raw JSON; the core tags the
    /// fields it consumes at the snapshot boundary.
    #[serde(default)]
    pub attributes: Value,

    /// All remaining fields (last_changed, context, ...).
    #[serde(flatten)]
    pub extra: Value,
}

// ── WebSocket: config/area_registry/list ─────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArea {
    pub area_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub extra: Value,
}

// ── WebSocket: config/device_registry/list ───────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDevice {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub name_by_user: Option<String>,

    #[serde(default)]
    pub area_id: Option<String>,

    #[serde(default)]
    pub manufacturer: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    /// `(namespace, key)` pairs, e.g. `["hue", "abcd1234"]`.
    #[serde(default)]
    pub identifiers: Vec<Vec<String>>,

    #[serde(flatten)]
    pub extra: Value,
}

// ── WebSocket: config/entity_registry/list ───────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntityEntry {
    pub entity_id: String,

    /// The immutable registry UUID — survives entity_id renames.
    pub id: String,

    #[serde(default)]
    pub device_id: Option<String>,

    #[serde(default)]
    pub area_id: Option<String>,

    /// `None` = enabled; otherwise who disabled it ("user", "integration", ...).
    #[serde(default)]
    pub disabled_by: Option<String>,

    #[serde(default)]
    pub labels: Vec<String>,

    /// User-set display name, if any.
    #[serde(default)]
    pub name: Option<String>,

    /// Integration-provided display name.
    #[serde(default)]
    pub original_name: Option<String>,

    #[serde(default)]
    pub platform: Option<String>,

    #[serde(flatten)]
    pub extra: Value,
}
