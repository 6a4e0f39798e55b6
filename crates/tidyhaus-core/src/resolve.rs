//! Area resolution cascade.
//!
//! Every entity is assigned exactly one area through a layered fallback:
//! registry links first, then state-attribute hints, then device-token
//! matching on the entity id, then a lexical match against area names.
//! Anything left over lands in the "Unassigned" sentinel.

use tracing::trace;

use crate::model::{Area, Entity, State, UNASSIGNED_AREA};
use crate::naming::slugify;
use crate::snapshot::Snapshot;

/// Result of area resolution. `id` is `None` only for the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArea {
    pub id: Option<String>,
    pub name: String,
}

impl ResolvedArea {
    #[must_use]
    pub fn from_area(area: &Area) -> Self {
        Self {
            id: Some(area.id.clone()),
            name: area.name.clone(),
        }
    }

    #[must_use]
    pub fn unassigned() -> Self {
        Self {
            id: None,
            name: UNASSIGNED_AREA.to_string(),
        }
    }

    /// Whether a real area was resolved (not the sentinel).
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.id.is_some()
    }
}

pub struct AreaResolver;

impl AreaResolver {
    /// Resolve the area for one entity. Total: always returns a value,
    /// falling back to the "Unassigned" sentinel.
    #[must_use]
    pub fn resolve(entity: &Entity, state: Option<&State>, snapshot: &Snapshot) -> ResolvedArea {
        // Tier 1: the device's registry area.
        if let Some(device_id) = entity.device_id.as_deref() {
            if let Some(area) = snapshot.device_area(device_id) {
                return ResolvedArea::from_area(area);
            }
        }

        // Tier 2: the entity's own registry area.
        if let Some(area_id) = entity.area_id.as_deref() {
            if let Some(area) = snapshot.area(area_id) {
                return ResolvedArea::from_area(area);
            }
        }

        // Disabled entities carry no live state and often stale ids;
        // heuristic tiers would misfile them.
        if entity.is_disabled() {
            return ResolvedArea::unassigned();
        }

        // Tier 3: state-attribute hints.
        if let Some(state) = state {
            if let Some(area_id) = state.attributes.area_id.as_deref() {
                if let Some(area) = snapshot.area(area_id) {
                    return ResolvedArea::from_area(area);
                }
            }
            if let Some(device_id) = state.attributes.device_id.as_deref() {
                if let Some(area) = snapshot.device_area(device_id) {
                    return ResolvedArea::from_area(area);
                }
            }
        }

        // Tier 4: match decreasing-length token prefixes of the object
        // id against the device token table.
        let tokens: Vec<&str> = entity.object_id().split('_').collect();
        for n in (1..=tokens.len()).rev() {
            let candidate = tokens[..n].join("_");
            if let Some(device) = snapshot.device_by_token(&candidate) {
                if let Some(area) = snapshot.device_area(&device.id) {
                    trace!(
                        entity_id = entity.entity_id,
                        token = candidate,
                        area = area.name,
                        "area via device token"
                    );
                    return ResolvedArea::from_area(area);
                }
            }
        }

        // Tier 5: lexical fallback on the slugged area name. Longer
        // slugs first so "gaestebad" wins over "bad".
        let mut by_slug: Vec<(String, &Area)> = snapshot
            .areas()
            .map(|a| (slugify(&a.name), a))
            .filter(|(slug, _)| !slug.is_empty())
            .collect();
        by_slug.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        let object_id = entity.object_id();
        // Only `{slug}_` prefixes count, never a bare `{slug}` object id.
        for (slug, area) in by_slug {
            if object_id.starts_with(&format!("{slug}_")) {
                trace!(
                    entity_id = entity.entity_id,
                    area = area.name,
                    "area via lexical match"
                );
                return ResolvedArea::from_area(area);
            }
        }

        ResolvedArea::unassigned()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::{Attributes, Device};
    use serde_json::json;

    fn area(id: &str, name: &str) -> Area {
        Area {
            id: id.into(),
            name: name.into(),
        }
    }

    fn device(id: &str, name: &str, area_id: Option<&str>) -> Device {
        Device {
            id: id.into(),
            name: Some(name.into()),
            name_by_user: None,
            area_id: area_id.map(Into::into),
            manufacturer: None,
            model: None,
            identifiers: vec![],
        }
    }

    fn entity(entity_id: &str) -> Entity {
        Entity {
            entity_id: entity_id.into(),
            registry_id: format!("uuid-{entity_id}"),
            device_id: None,
            area_id: None,
            disabled_by: None,
            labels: BTreeSet::new(),
            name: None,
            original_name: None,
            platform: None,
        }
    }

    fn snap() -> Snapshot {
        Snapshot::new(
            vec![area("bad", "Bad"), area("gaestebad", "Gästebad")],
            vec![
                device("dev1", "Shelly 1", Some("bad")),
                device("dev2", "Hue Bridge", None),
            ],
            vec![],
            vec![],
        )
    }

    #[test]
    fn device_area_beats_entity_area() {
        let mut e = entity("light.x");
        e.device_id = Some("dev1".into());
        e.area_id = Some("gaestebad".into());
        let resolved = AreaResolver::resolve(&e, None, &snap());
        assert_eq!(resolved.name, "Bad");
    }

    #[test]
    fn entity_area_when_device_missing() {
        let mut e = entity("light.x");
        e.device_id = Some("gone".into());
        e.area_id = Some("gaestebad".into());
        let resolved = AreaResolver::resolve(&e, None, &snap());
        assert_eq!(resolved.name, "Gästebad");
    }

    #[test]
    fn state_attribute_hint() {
        let e = entity("light.x");
        let state = State {
            entity_id: "light.x".into(),
            state: "on".into(),
            attributes: Attributes::from_raw(json!({ "area_id": "bad" })),
        };
        let resolved = AreaResolver::resolve(&e, Some(&state), &snap());
        assert_eq!(resolved.name, "Bad");
    }

    #[test]
    fn device_token_match_beats_lexical() {
        // "shelly_1" matches dev1's name token; dev1 sits in Bad even
        // though no area name appears in the entity id.
        let e = entity("switch.shelly_1_relay");
        let resolved = AreaResolver::resolve(&e, None, &snap());
        assert_eq!(resolved.name, "Bad");
    }

    #[test]
    fn lexical_prefers_longer_area_slug() {
        let e = entity("light.gastebad_spiegel");
        let resolved = AreaResolver::resolve(&e, None, &snap());
        assert_eq!(resolved.name, "Gästebad");

        let e2 = entity("light.bad_decke");
        let resolved2 = AreaResolver::resolve(&e2, None, &snap());
        assert_eq!(resolved2.name, "Bad");
    }

    #[test]
    fn lexical_requires_token_separator() {
        // A bare area-name object id is not a lexical match; only
        // "{slug}_..." prefixes resolve.
        let e = entity("light.bad");
        let resolved = AreaResolver::resolve(&e, None, &snap());
        assert!(!resolved.is_assigned());
    }

    #[test]
    fn unresolvable_entity_is_unassigned() {
        let e = entity("sensor.uptime");
        let resolved = AreaResolver::resolve(&e, None, &snap());
        assert!(!resolved.is_assigned());
        assert_eq!(resolved.name, UNASSIGNED_AREA);
    }

    #[test]
    fn disabled_entities_skip_heuristic_tiers() {
        let mut e = entity("light.bad_decke");
        e.disabled_by = Some("user".into());
        let resolved = AreaResolver::resolve(&e, None, &snap());
        assert_eq!(resolved.name, UNASSIGNED_AREA);

        // registry links still apply
        e.device_id = Some("dev1".into());
        let resolved = AreaResolver::resolve(&e, None, &snap());
        assert_eq!(resolved.name, "Bad");
    }
}
