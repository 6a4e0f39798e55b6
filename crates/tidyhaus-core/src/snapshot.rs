//! Point-in-time capture of the registry and state table.
//!
//! A [`Snapshot`] is taken once per preview or execute call and is the
//! only thing the resolver and generator read. That keeps a whole pass
//! internally consistent even while the backend keeps moving.

use std::collections::{BTreeMap, HashMap};

use crate::model::{Area, Device, Entity, State};
use crate::naming::slugify;

pub struct Snapshot {
    areas: HashMap<String, Area>,
    devices: HashMap<String, Device>,
    entities: BTreeMap<String, Entity>,
    states: HashMap<String, State>,
    /// Lowercased token -> device id, for name-token area resolution.
    /// Only devices that actually have an area are indexed.
    device_tokens: HashMap<String, String>,
}

impl Snapshot {
    #[must_use]
    pub fn new(
        areas: Vec<Area>,
        devices: Vec<Device>,
        entities: Vec<Entity>,
        states: Vec<State>,
    ) -> Self {
        let areas: HashMap<_, _> = areas.into_iter().map(|a| (a.id.clone(), a)).collect();
        let devices: HashMap<_, _> = devices.into_iter().map(|d| (d.id.clone(), d)).collect();
        let entities = entities
            .into_iter()
            .map(|e| (e.entity_id.clone(), e))
            .collect();
        let states = states
            .into_iter()
            .map(|s| (s.entity_id.clone(), s))
            .collect();

        let mut device_tokens = HashMap::new();
        for device in devices.values() {
            if device.area_id.is_none() {
                continue;
            }
            for token in Self::tokens_of(device) {
                device_tokens.entry(token).or_insert_with(|| device.id.clone());
            }
        }

        Self {
            areas,
            devices,
            entities,
            states,
            device_tokens,
        }
    }

    fn tokens_of(device: &Device) -> Vec<String> {
        let mut tokens = Vec::new();
        if let Some(name) = &device.name_by_user {
            tokens.push(slugify(name));
        }
        if let Some(name) = &device.name {
            tokens.push(slugify(name));
        }
        for (_, key) in &device.identifiers {
            tokens.push(key.to_lowercase());
        }
        tokens.retain(|t| !t.is_empty());
        tokens
    }

    // ── Lookups ─────────────────────────────────────────────────────

    #[must_use]
    pub fn area(&self, area_id: &str) -> Option<&Area> {
        self.areas.get(area_id)
    }

    #[must_use]
    pub fn area_name(&self, area_id: &str) -> Option<&str> {
        self.areas.get(area_id).map(|a| a.name.as_str())
    }

    #[must_use]
    pub fn device(&self, device_id: &str) -> Option<&Device> {
        self.devices.get(device_id)
    }

    /// The area a device sits in, if both links resolve.
    #[must_use]
    pub fn device_area(&self, device_id: &str) -> Option<&Area> {
        self.devices
            .get(device_id)
            .and_then(|d| d.area_id.as_deref())
            .and_then(|id| self.areas.get(id))
    }

    #[must_use]
    pub fn entity(&self, entity_id: &str) -> Option<&Entity> {
        self.entities.get(entity_id)
    }

    #[must_use]
    pub fn state(&self, entity_id: &str) -> Option<&State> {
        self.states.get(entity_id)
    }

    /// Device whose token table contains `token` (already lowercased).
    #[must_use]
    pub fn device_by_token(&self, token: &str) -> Option<&Device> {
        self.device_tokens
            .get(token)
            .and_then(|id| self.devices.get(id))
    }

    // ── Iteration ───────────────────────────────────────────────────

    /// All registry entities, ordered by entity id.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    pub fn entities_for_device<'a>(
        &'a self,
        device_id: &'a str,
    ) -> impl Iterator<Item = &'a Entity> {
        self.entities
            .values()
            .filter(move |e| e.device_id.as_deref() == Some(device_id))
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    // ── Mutation ────────────────────────────────────────────────────

    /// Patch a device's user name in place after a successful backend
    /// rename, so the entity pass sees the new name without a refetch.
    pub fn set_device_name(&mut self, device_id: &str, name: &str) {
        if let Some(device) = self.devices.get_mut(device_id) {
            device.name_by_user = Some(name.to_string());
        }
    }
}
