#![allow(clippy::unwrap_used)]
// End-to-end engine tests against an in-memory backend.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use tidyhaus_core::{
    Area, Attributes, Backend, CoreError, Device, DeviceSelection, Entity, EntityChange,
    ExecuteSelection, MemoryOverrideStore, OverrideScope, OverrideStore, PreviewOptions,
    ReferenceKind, Restructurer, State, Structure,
};

// ── Fake backend ────────────────────────────────────────────────────

#[derive(Default)]
struct World {
    areas: Vec<Area>,
    devices: Vec<Device>,
    entities: Vec<Entity>,
    states: Vec<State>,
    configs: HashMap<(ReferenceKind, String), Value>,
    config_writes: usize,
}

#[derive(Default)]
struct FakeBackend {
    world: Mutex<World>,
}

impl FakeBackend {
    fn new(world: World) -> Self {
        Self {
            world: Mutex::new(world),
        }
    }

    fn entity(&self, entity_id: &str) -> Option<Entity> {
        let world = self.world.lock().unwrap();
        world.entities.iter().find(|e| e.entity_id == entity_id).cloned()
    }

    fn config(&self, kind: ReferenceKind, id: &str) -> Option<Value> {
        let world = self.world.lock().unwrap();
        world.configs.get(&(kind, id.to_string())).cloned()
    }

    fn device(&self, device_id: &str) -> Option<Device> {
        let world = self.world.lock().unwrap();
        world.devices.iter().find(|d| d.id == device_id).cloned()
    }

    fn config_write_count(&self) -> usize {
        self.world.lock().unwrap().config_writes
    }
}

impl Backend for FakeBackend {
    async fn states(&self) -> Result<Vec<State>, CoreError> {
        Ok(self.world.lock().unwrap().states.clone())
    }

    async fn structure(&self) -> Result<Structure, CoreError> {
        let world = self.world.lock().unwrap();
        Ok(Structure {
            areas: world.areas.clone(),
            devices: world.devices.clone(),
            entities: world.entities.clone(),
        })
    }

    async fn update_entity(
        &self,
        entity_id: &str,
        change: &EntityChange,
    ) -> Result<(), CoreError> {
        let mut world = self.world.lock().unwrap();
        let entity = world
            .entities
            .iter_mut()
            .find(|e| e.entity_id == entity_id)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "entity".into(),
                identifier: entity_id.into(),
            })?;
        if let Some(new_id) = &change.new_entity_id {
            entity.entity_id.clone_from(new_id);
        }
        if let Some(name) = &change.name {
            entity.name = Some(name.clone());
        }
        if change.enable {
            entity.disabled_by = None;
        }
        let new_id = entity.entity_id.clone();
        if let Some(state) = world.states.iter_mut().find(|s| s.entity_id == entity_id) {
            state.entity_id.clone_from(&new_id);
            if let Some(name) = &change.name {
                state.attributes.friendly_name = Some(name.clone());
            }
        }
        Ok(())
    }

    async fn set_labels(&self, entity_id: &str, labels: Vec<String>) -> Result<(), CoreError> {
        let mut world = self.world.lock().unwrap();
        let entity = world
            .entities
            .iter_mut()
            .find(|e| e.entity_id == entity_id)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "entity".into(),
                identifier: entity_id.into(),
            })?;
        entity.labels = labels.into_iter().collect();
        Ok(())
    }

    async fn rename_device(&self, device_id: &str, name: &str) -> Result<bool, CoreError> {
        let mut world = self.world.lock().unwrap();
        match world.devices.iter_mut().find(|d| d.id == device_id) {
            Some(device) => {
                device.name_by_user = Some(name.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_config(
        &self,
        kind: ReferenceKind,
        config_id: &str,
    ) -> Result<Option<Value>, CoreError> {
        Ok(self.config(kind, config_id))
    }

    async fn update_config(
        &self,
        kind: ReferenceKind,
        config_id: &str,
        config: &Value,
    ) -> Result<(), CoreError> {
        let mut world = self.world.lock().unwrap();
        world.config_writes += 1;
        world
            .configs
            .insert((kind, config_id.to_string()), config.clone());
        Ok(())
    }
}

// ── Builders ────────────────────────────────────────────────────────

fn area(id: &str, name: &str) -> Area {
    Area {
        id: id.into(),
        name: name.into(),
    }
}

fn device(id: &str, name: &str, area_id: &str) -> Device {
    Device {
        id: id.into(),
        name: Some(name.into()),
        name_by_user: None,
        area_id: Some(area_id.into()),
        manufacturer: None,
        model: None,
        identifiers: vec![],
    }
}

fn entity(entity_id: &str, device_id: Option<&str>) -> Entity {
    Entity {
        entity_id: entity_id.into(),
        registry_id: format!("uuid-{entity_id}"),
        device_id: device_id.map(Into::into),
        area_id: None,
        disabled_by: None,
        labels: BTreeSet::new(),
        name: None,
        original_name: None,
        platform: None,
    }
}

fn state(entity_id: &str, attrs: Value) -> State {
    State {
        entity_id: entity_id.into(),
        state: "on".into(),
        attributes: Attributes::from_raw(attrs),
    }
}

/// The standard fixture: one bathroom with a Shelly device and a
/// conventional-and-unconventional pair of lights.
fn bathroom_world() -> World {
    World {
        areas: vec![area("bad", "Bad")],
        devices: vec![device("dev1", "Shelly 1", "bad")],
        entities: vec![
            entity("light.bad_decke", Some("dev1")),
            entity("light.aqara_x1", Some("dev1")),
        ],
        states: vec![
            state("light.bad_decke", json!({ "friendly_name": "Bad Shelly 1" })),
            state("light.aqara_x1", json!({ "friendly_name": "Aqara X1" })),
        ],
        configs: HashMap::new(),
        config_writes: 0,
    }
}

fn engine(world: World) -> Restructurer<FakeBackend, MemoryOverrideStore> {
    Restructurer::new(FakeBackend::new(world), MemoryOverrideStore::new())
}

// ── Preview ─────────────────────────────────────────────────────────

#[tokio::test]
async fn preview_proposes_conventional_names() {
    let engine = engine(bathroom_world());
    let result = engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();

    assert_eq!(result.preview_id, "Bad_light");
    assert_eq!(result.groups.len(), 1);
    let changes = &result.groups[0].entities;
    assert_eq!(changes.len(), 2);

    let decke = changes.iter().find(|c| c.old_id == "light.bad_decke").unwrap();
    assert_eq!(decke.new_id, "light.bad_shelly_1");
    assert_eq!(decke.new_name, "Bad Shelly 1");
    assert!(decke.needs_rename);

    let aqara = changes.iter().find(|c| c.old_id == "light.aqara_x1").unwrap();
    assert_eq!(aqara.new_name, "Bad Shelly 1 Aqara X1");
}

#[tokio::test]
async fn preview_validates_inputs() {
    let engine = engine(bathroom_world());
    let err = engine
        .preview(&PreviewOptions {
            area: String::new(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
}

#[tokio::test]
async fn device_override_flows_into_proposals() {
    let engine = engine(bathroom_world());
    engine
        .overrides()
        .set(OverrideScope::Device, "dev1", "Deckenlicht")
        .unwrap();

    let result = engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();

    let decke = result.groups[0]
        .entities
        .iter()
        .find(|c| c.old_id == "light.bad_decke")
        .unwrap();
    assert_eq!(decke.new_id, "light.bad_deckenlicht");
    assert_eq!(decke.new_name, "Bad Deckenlicht");
    assert_eq!(
        result.groups[0].suggested_device_name.as_deref(),
        Some("Bad Deckenlicht")
    );
}

#[tokio::test]
async fn empty_preview_is_not_cached() {
    let engine = engine(bathroom_world());
    let result = engine
        .preview(&PreviewOptions {
            area: "Keller".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();
    assert!(result.is_empty());

    let err = engine
        .execute(&ExecuteSelection {
            preview_id: "Keller_light".into(),
            entities: vec!["light.x".into()],
            ..ExecuteSelection::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::PreviewNotFound { .. }));
}

#[tokio::test]
async fn skip_reviewed_drops_maintained_entities() {
    let mut world = bathroom_world();
    world.entities[0].labels.insert("maintained".into());
    let engine = engine(world);

    let result = engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            skip_reviewed: true,
            ..PreviewOptions::default()
        })
        .await
        .unwrap();
    assert_eq!(result.total_entities(), 1);
    assert_eq!(result.groups[0].entities[0].old_id, "light.aqara_x1");
}

#[tokio::test]
async fn disabled_entities_need_show_disabled() {
    let mut world = bathroom_world();
    world.entities[1].disabled_by = Some("user".into());
    let engine = engine(world);

    let hidden = engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();
    assert_eq!(hidden.total_entities(), 1);

    let shown = engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            show_disabled: true,
            ..PreviewOptions::default()
        })
        .await
        .unwrap();
    assert_eq!(shown.total_entities(), 2);
}

// ── Execute ─────────────────────────────────────────────────────────

#[tokio::test]
async fn execute_renames_selected_entities_only() {
    let engine = engine(bathroom_world());
    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();

    let report = engine
        .execute(&ExecuteSelection {
            preview_id: "Bad_light".into(),
            entities: vec!["light.bad_decke".into()],
            ..ExecuteSelection::default()
        })
        .await
        .unwrap();

    assert_eq!(report.success.len(), 1);
    assert_eq!(report.success[0].new_id, "light.bad_shelly_1");
    assert!(report.failed.is_empty());

    let backend = engine.backend();
    assert!(backend.entity("light.bad_shelly_1").is_some());
    // the unselected entity is untouched
    assert!(backend.entity("light.aqara_x1").is_some());
}

#[tokio::test]
async fn execute_applies_maintained_label() {
    let engine = engine(bathroom_world());
    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();
    engine
        .execute(&ExecuteSelection {
            preview_id: "Bad_light".into(),
            entities: vec!["light.bad_decke".into()],
            ..ExecuteSelection::default()
        })
        .await
        .unwrap();

    let renamed = engine.backend().entity("light.bad_shelly_1").unwrap();
    assert!(renamed.labels.contains("maintained"));
}

#[tokio::test]
async fn skipped_conventional_entity_gets_maintained_label() {
    let mut world = bathroom_world();
    world.entities[0] = entity("light.bad_shelly_1", Some("dev1"));
    world.states[0] = state(
        "light.bad_shelly_1",
        json!({ "friendly_name": "Bad Shelly 1" }),
    );
    let engine = engine(world);

    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();
    let report = engine
        .execute(&ExecuteSelection {
            preview_id: "Bad_light".into(),
            entities: vec!["light.bad_shelly_1".into()],
            ..ExecuteSelection::default()
        })
        .await
        .unwrap();

    assert!(report.success.is_empty());
    assert_eq!(report.skipped.len(), 1);
    // the skip still stamps the label, so skip_reviewed previews stop
    // listing this entity
    let unchanged = engine.backend().entity("light.bad_shelly_1").unwrap();
    assert!(unchanged.labels.contains("maintained"));
}

#[tokio::test]
async fn selection_outside_the_preview_is_not_processed() {
    let mut world = bathroom_world();
    world.areas.push(area("keller", "Keller"));
    world.devices.push(device("dev2", "Boiler", "keller"));
    world.entities.push(entity("sensor.keller_temp", Some("dev2")));
    world.states.push(state(
        "sensor.keller_temp",
        json!({ "friendly_name": "Temperatur" }),
    ));
    let engine = engine(world);

    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();
    let report = engine
        .execute(&ExecuteSelection {
            preview_id: "Bad_light".into(),
            entities: vec!["light.bad_decke".into(), "sensor.keller_temp".into()],
            ..ExecuteSelection::default()
        })
        .await
        .unwrap();

    assert_eq!(report.success.len(), 1);
    assert_eq!(report.success[0].old_id, "light.bad_decke");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].id, "sensor.keller_temp");
    assert!(report.skipped[0].reason.contains("not part of the preview"));
    // the out-of-scope sensor keeps its id and name
    let sensor = engine.backend().entity("sensor.keller_temp").unwrap();
    assert!(sensor.name.is_none());
}

#[tokio::test]
async fn device_only_selection_leaves_entities_untouched() {
    let engine = engine(bathroom_world());
    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();

    let report = engine
        .execute(&ExecuteSelection {
            preview_id: "Bad_light".into(),
            devices: vec![DeviceSelection {
                device_id: "dev1".into(),
                new_name: "Bad Deckenlicht".into(),
            }],
            ..ExecuteSelection::default()
        })
        .await
        .unwrap();

    assert_eq!(report.device_success.len(), 1);
    assert!(report.success.is_empty());

    let backend = engine.backend();
    assert_eq!(
        backend.device("dev1").unwrap().name_by_user.as_deref(),
        Some("Bad Deckenlicht")
    );
    // member entities keep their ids and names until selected themselves
    assert!(backend.entity("light.bad_decke").unwrap().name.is_none());
    assert!(backend.entity("light.aqara_x1").unwrap().name.is_none());
}

#[tokio::test]
async fn preview_is_single_use() {
    let engine = engine(bathroom_world());
    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();

    let selection = ExecuteSelection {
        preview_id: "Bad_light".into(),
        entities: vec!["light.bad_decke".into()],
        ..ExecuteSelection::default()
    };
    engine.execute(&selection).await.unwrap();

    let err = engine.execute(&selection).await.unwrap_err();
    assert!(matches!(err, CoreError::PreviewNotFound { .. }));
}

#[tokio::test]
async fn execute_rejects_empty_selection() {
    let engine = engine(bathroom_world());
    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();

    let err = engine
        .execute(&ExecuteSelection {
            preview_id: "Bad_light".into(),
            ..ExecuteSelection::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
}

#[tokio::test]
async fn rename_is_idempotent_across_cycles() {
    let engine = engine(bathroom_world());
    let opts = PreviewOptions {
        area: "Bad".into(),
        domain: "light".into(),
        ..PreviewOptions::default()
    };
    let first = engine.preview(&opts).await.unwrap();
    let all: Vec<String> = first
        .groups
        .iter()
        .flat_map(|g| &g.entities)
        .map(|c| c.old_id.clone())
        .collect();
    engine
        .execute(&ExecuteSelection {
            preview_id: first.preview_id.clone(),
            entities: all,
            ..ExecuteSelection::default()
        })
        .await
        .unwrap();

    let second = engine.preview(&opts).await.unwrap();
    assert_eq!(second.total_renames(), 0, "{second:#?}");
}

#[tokio::test]
async fn device_pass_renames_device_then_entities() {
    let engine = engine(bathroom_world());
    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();

    let report = engine
        .execute(&ExecuteSelection {
            preview_id: "Bad_light".into(),
            entities: vec!["light.bad_decke".into()],
            devices: vec![DeviceSelection {
                device_id: "dev1".into(),
                new_name: "Bad Deckenlicht".into(),
            }],
            ..ExecuteSelection::default()
        })
        .await
        .unwrap();

    assert_eq!(report.device_success.len(), 1);
    // entity recomputed against the renamed device
    assert_eq!(report.success[0].new_id, "light.bad_deckenlicht");
    assert_eq!(report.success[0].new_name, "Bad Deckenlicht");

    let backend = engine.backend();
    assert_eq!(
        backend.device("dev1").unwrap().name_by_user.as_deref(),
        Some("Bad Deckenlicht")
    );
    // the device override persists for future passes
    assert_eq!(
        engine.overrides().get(OverrideScope::Device, "dev1").as_deref(),
        Some("Deckenlicht")
    );
}

#[tokio::test]
async fn execute_enables_disabled_entities_on_request() {
    let mut world = bathroom_world();
    world.entities[0].disabled_by = Some("user".into());
    let engine = engine(world);

    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            show_disabled: true,
            ..PreviewOptions::default()
        })
        .await
        .unwrap();
    engine
        .execute(&ExecuteSelection {
            preview_id: "Bad_light".into(),
            entities: vec!["light.bad_decke".into()],
            enable_disabled: true,
            ..ExecuteSelection::default()
        })
        .await
        .unwrap();

    let renamed = engine.backend().entity("light.bad_shelly_1").unwrap();
    assert!(renamed.disabled_by.is_none());
}

#[tokio::test]
async fn update_mapping_edit_wins_over_recompute() {
    let engine = engine(bathroom_world());
    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();

    engine
        .update_mapping(
            "Bad_light",
            "light.bad_decke",
            "light.bad_hauptlicht",
            "Bad Hauptlicht",
        )
        .unwrap();

    let report = engine
        .execute(&ExecuteSelection {
            preview_id: "Bad_light".into(),
            entities: vec!["light.bad_decke".into()],
            ..ExecuteSelection::default()
        })
        .await
        .unwrap();
    assert_eq!(report.success[0].new_id, "light.bad_hauptlicht");
    assert_eq!(report.success[0].new_name, "Bad Hauptlicht");
}

#[tokio::test]
async fn update_mapping_rejects_domain_change() {
    let engine = engine(bathroom_world());
    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();

    let err = engine
        .update_mapping("Bad_light", "light.bad_decke", "switch.bad_decke", "X")
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
}

// ── Dependency propagation ──────────────────────────────────────────

fn world_with_scene() -> World {
    let mut world = bathroom_world();
    world.states.push(state(
        "scene.abend",
        json!({ "entity_id": ["light.bad_decke"], "id": "100" }),
    ));
    world.configs.insert(
        (ReferenceKind::Scene, "100".into()),
        json!({ "name": "Abend", "entities": { "light.bad_decke": "on" } }),
    );
    world
}

#[tokio::test]
async fn id_rename_rewrites_scene_config() {
    let engine = engine(world_with_scene());
    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();
    let report = engine
        .execute(&ExecuteSelection {
            preview_id: "Bad_light".into(),
            entities: vec!["light.bad_decke".into()],
            ..ExecuteSelection::default()
        })
        .await
        .unwrap();
    assert!(report.dependency_warnings.is_empty(), "{report:#?}");

    let config = engine
        .backend()
        .config(ReferenceKind::Scene, "100")
        .unwrap();
    let text = config.to_string();
    assert!(text.contains("light.bad_shelly_1"));
    assert!(!text.contains("light.bad_decke"));
}

#[tokio::test]
async fn name_only_update_leaves_configs_untouched() {
    // conventional id, unconventional display name: the update changes
    // the name but never the id, so no dependency rewrite runs
    let mut world = bathroom_world();
    world.entities[0] = entity("light.bad_shelly_1", Some("dev1"));
    world.states[0] = state(
        "light.bad_shelly_1",
        json!({ "friendly_name": "Altes Licht" }),
    );
    world.states.push(state(
        "scene.abend",
        json!({ "entity_id": ["light.bad_shelly_1"], "id": "100" }),
    ));
    world.configs.insert(
        (ReferenceKind::Scene, "100".into()),
        json!({ "name": "Abend", "entities": { "light.bad_shelly_1": "on" } }),
    );
    let engine = engine(world);

    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();
    let report = engine
        .execute(&ExecuteSelection {
            preview_id: "Bad_light".into(),
            entities: vec!["light.bad_shelly_1".into()],
            ..ExecuteSelection::default()
        })
        .await
        .unwrap();

    assert_eq!(report.success.len(), 1);
    assert_eq!(report.success[0].new_id, "light.bad_shelly_1");
    assert_eq!(report.success[0].new_name, "Bad Shelly 1");
    assert_eq!(engine.backend().config_write_count(), 0);
}

#[tokio::test]
async fn group_references_surface_as_warnings() {
    let mut world = bathroom_world();
    world.states.push(state(
        "group.erdgeschoss",
        json!({ "entity_id": ["light.bad_decke"] }),
    ));
    let engine = engine(world);

    engine
        .preview(&PreviewOptions {
            area: "Bad".into(),
            domain: "light".into(),
            ..PreviewOptions::default()
        })
        .await
        .unwrap();
    let report = engine
        .execute(&ExecuteSelection {
            preview_id: "Bad_light".into(),
            entities: vec!["light.bad_decke".into()],
            ..ExecuteSelection::default()
        })
        .await
        .unwrap();

    assert!(
        report
            .dependency_warnings
            .iter()
            .any(|w| w.contains("group.erdgeschoss"))
    );
}

#[tokio::test]
async fn dependencies_reports_references_without_writing() {
    let engine = engine(world_with_scene());
    let refs = engine.dependencies("light.bad_decke").await.unwrap();
    assert_eq!(refs[&ReferenceKind::Scene], vec!["scene.abend"]);

    // config untouched by a find-only scan
    let config = engine
        .backend()
        .config(ReferenceKind::Scene, "100")
        .unwrap();
    assert!(config.to_string().contains("light.bad_decke"));
}

// ── Supplemental operations ─────────────────────────────────────────

#[tokio::test]
async fn areas_summarizes_per_area_domains() {
    let mut world = bathroom_world();
    world.entities.push(entity("sensor.uptime", None));
    world
        .states
        .push(state("sensor.uptime", json!({ "friendly_name": "Uptime" })));
    let engine = engine(world);

    let summaries = engine.areas().await.unwrap();
    let bad = summaries.iter().find(|s| s.name == "Bad").unwrap();
    assert_eq!(bad.entity_count, 2);
    assert_eq!(bad.domains.get("light"), Some(&2));

    let unassigned = summaries.iter().find(|s| s.id.is_none()).unwrap();
    assert_eq!(unassigned.entity_count, 1);
}

#[tokio::test]
async fn stats_counts_domains() {
    let engine = engine(bathroom_world());
    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.total_entities, 2);
    assert_eq!(stats.area_count, 1);
    assert_eq!(stats.domains.get("light"), Some(&2));
}

#[tokio::test]
async fn entity_override_pushes_new_friendly_name() {
    let engine = engine(bathroom_world());
    let new_name = engine
        .set_entity_override("light.aqara_x1", "Spiegellicht")
        .await
        .unwrap();
    assert_eq!(new_name, "Bad Shelly 1 Spiegellicht");

    let entity = engine.backend().entity("light.aqara_x1").unwrap();
    assert_eq!(entity.name.as_deref(), Some("Bad Shelly 1 Spiegellicht"));
}

#[tokio::test]
async fn standalone_device_rename_persists_override() {
    let engine = engine(bathroom_world());
    engine.rename_device("dev1", "Bad Spiegel").await.unwrap();

    assert_eq!(
        engine.backend().device("dev1").unwrap().name_by_user.as_deref(),
        Some("Bad Spiegel")
    );
    assert_eq!(
        engine.overrides().get(OverrideScope::Device, "dev1").as_deref(),
        Some("Spiegel")
    );
}

#[tokio::test]
async fn rename_unknown_device_is_not_found() {
    let engine = engine(bathroom_world());
    let err = engine.rename_device("ghost", "X").await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}
