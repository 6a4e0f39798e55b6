//! Conversions from raw wire payloads into the domain model.

use tidyhaus_api::{RawArea, RawDevice, RawEntityEntry, RawState};

use crate::model::{Area, Attributes, Device, Entity, State};

impl From<RawState> for State {
    fn from(raw: RawState) -> Self {
        Self {
            entity_id: raw.entity_id,
            state: raw.state,
            attributes: Attributes::from_raw(raw.attributes),
        }
    }
}

impl From<RawArea> for Area {
    fn from(raw: RawArea) -> Self {
        Self {
            id: raw.area_id,
            name: raw.name,
        }
    }
}

impl From<RawDevice> for Device {
    fn from(raw: RawDevice) -> Self {
        let identifiers = raw
            .identifiers
            .into_iter()
            .filter_map(|pair| {
                let mut it = pair.into_iter();
                match (it.next(), it.next()) {
                    (Some(ns), Some(key)) => Some((ns, key)),
                    _ => None,
                }
            })
            .collect();
        Self {
            id: raw.id,
            name: raw.name,
            name_by_user: raw.name_by_user,
            area_id: raw.area_id,
            manufacturer: raw.manufacturer,
            model: raw.model,
            identifiers,
        }
    }
}

impl From<RawEntityEntry> for Entity {
    fn from(raw: RawEntityEntry) -> Self {
        Self {
            entity_id: raw.entity_id,
            registry_id: raw.id,
            device_id: raw.device_id,
            area_id: raw.area_id,
            disabled_by: raw.disabled_by,
            labels: raw.labels.into_iter().collect(),
            name: raw.name,
            original_name: raw.original_name,
            platform: raw.platform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_identifier_pairs() {
        let raw: RawDevice = serde_json::from_value(json!({
            "id": "dev1",
            "name": "Shelly 1",
            "identifiers": [["shelly", "aabbcc"], ["broken"]]
        }))
        .unwrap();
        let device = Device::from(raw);
        assert_eq!(
            device.identifiers,
            vec![("shelly".to_string(), "aabbcc".to_string())]
        );
    }

    #[test]
    fn entity_labels_become_set() {
        let raw: RawEntityEntry = serde_json::from_value(json!({
            "entity_id": "light.bad_decke",
            "id": "uuid-1",
            "labels": ["maintained", "maintained", "other"]
        }))
        .unwrap();
        let entity = Entity::from(raw);
        assert_eq!(entity.labels.len(), 2);
        assert!(entity.labels.contains("maintained"));
    }
}
