// ── Live state snapshot of an entity ──

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::structure::entity_domain;

/// One row from the states table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub entity_id: String,
    pub state: String,
    pub attributes: Attributes,
}

impl State {
    #[must_use]
    pub fn domain(&self) -> &str {
        entity_domain(&self.entity_id)
    }

    /// Display name from the attributes, falling back to the entity id.
    #[must_use]
    pub fn friendly_name(&self) -> &str {
        self.attributes
            .friendly_name
            .as_deref()
            .unwrap_or(&self.entity_id)
    }
}

/// Typed view over the attribute bag. Fields the engine cares about are
/// lifted out; everything else stays reachable through `raw`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub friendly_name: Option<String>,
    /// Area hint some integrations publish directly on the state.
    pub area_id: Option<String>,
    pub device_id: Option<String>,
    /// Member list of a scene or group state.
    pub entity_list: Vec<String>,
    /// Storage config id of a scene, script, or automation.
    pub config_id: Option<String>,
    pub raw: Value,
}

impl Attributes {
    /// Lift the known fields out of a raw attribute object.
    #[must_use]
    pub fn from_raw(raw: Value) -> Self {
        let str_field = |key: &str| {
            raw.get(key)
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
        };
        let entity_list = raw
            .get("entity_id")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            friendly_name: str_field("friendly_name"),
            area_id: str_field("area_id"),
            device_id: str_field("device_id"),
            entity_list,
            config_id: str_field("id"),
            raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lifts_known_fields() {
        let attrs = Attributes::from_raw(json!({
            "friendly_name": "Abend",
            "entity_id": ["light.bad_decke", "light.flur"],
            "id": "1700000000001",
            "brightness": 128
        }));
        assert_eq!(attrs.friendly_name.as_deref(), Some("Abend"));
        assert_eq!(attrs.entity_list, vec!["light.bad_decke", "light.flur"]);
        assert_eq!(attrs.config_id.as_deref(), Some("1700000000001"));
        assert_eq!(attrs.raw["brightness"], 128);
    }

    #[test]
    fn friendly_name_falls_back_to_entity_id() {
        let state = State {
            entity_id: "sensor.x".into(),
            state: "1".into(),
            attributes: Attributes::from_raw(json!({})),
        };
        assert_eq!(state.friendly_name(), "sensor.x");
    }
}
