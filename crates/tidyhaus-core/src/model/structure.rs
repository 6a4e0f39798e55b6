// ── Registry structure: areas, devices, entities ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A registry area (room).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
}

/// A registry device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    /// Name reported by the integration.
    pub name: Option<String>,
    /// User-assigned name; wins over `name` when present.
    pub name_by_user: Option<String>,
    pub area_id: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    /// Integration identifier pairs, e.g. `("shelly", "aabbcc")`.
    pub identifiers: Vec<(String, String)>,
}

impl Device {
    /// The name shown to the user: `name_by_user` if set, else the
    /// integration-reported name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name_by_user
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.name.as_deref())
            .unwrap_or("Unnamed device")
    }
}

/// A registry entity entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// The `domain.object_id` identifier, e.g. `light.bad_decke`.
    pub entity_id: String,
    /// Stable registry UUID, unchanged by renames.
    pub registry_id: String,
    pub device_id: Option<String>,
    /// Direct area assignment; overrides the device's area.
    pub area_id: Option<String>,
    /// Populated when the entity is disabled (`"user"`, `"integration"`, ...).
    pub disabled_by: Option<String>,
    pub labels: BTreeSet<String>,
    /// User-assigned friendly name from the registry.
    pub name: Option<String>,
    /// Name reported by the integration.
    pub original_name: Option<String>,
    pub platform: Option<String>,
}

impl Entity {
    /// Domain part of the entity id (`light` in `light.bad_decke`).
    #[must_use]
    pub fn domain(&self) -> &str {
        entity_domain(&self.entity_id)
    }

    /// Object-id part of the entity id (`bad_decke` in `light.bad_decke`).
    #[must_use]
    pub fn object_id(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map_or(self.entity_id.as_str(), |(_, o)| o)
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled_by.is_some()
    }
}

/// Domain part of any `domain.object_id` identifier.
#[must_use]
pub fn entity_domain(entity_id: &str) -> &str {
    entity_id.split_once('.').map_or(entity_id, |(d, _)| d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> Device {
        Device {
            id: "dev1".into(),
            name: Some("Shelly 1".into()),
            name_by_user: None,
            area_id: None,
            manufacturer: None,
            model: None,
            identifiers: vec![],
        }
    }

    #[test]
    fn display_name_prefers_user_name() {
        let mut d = device();
        assert_eq!(d.display_name(), "Shelly 1");
        d.name_by_user = Some("Deckenlicht".into());
        assert_eq!(d.display_name(), "Deckenlicht");
    }

    #[test]
    fn display_name_ignores_blank_user_name() {
        let mut d = device();
        d.name_by_user = Some("  ".into());
        assert_eq!(d.display_name(), "Shelly 1");
    }

    #[test]
    fn entity_id_parts() {
        assert_eq!(entity_domain("light.bad_decke"), "light");
        assert_eq!(entity_domain("nodot"), "nodot");
    }
}
