//! Dependency scanning and rewriting.
//!
//! Renaming an entity id silently breaks every scene, script, and
//! automation that refers to it. The scanner finds those references in
//! the live state table; the updater rewrites the stored configs through
//! the config API. Matching is substring-based over the serialized
//! payloads, which can over-match on id prefixes; holders where the
//! rewrite turns out to be a no-op are skipped at write time.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::error::CoreError;
use crate::model::{ReferenceKind, State};
use crate::snapshot::Snapshot;

/// Holder entity ids per reference kind.
pub type ReferenceMap = BTreeMap<ReferenceKind, Vec<String>>;

pub struct DependencyScanner;

impl DependencyScanner {
    /// Scan the live state table for references to `entity_id`.
    ///
    /// Scenes and groups declare members in their entity-list attribute;
    /// scripts and automations are matched by substring over the full
    /// serialized attribute payload (this catches blueprint inputs too).
    #[must_use]
    pub fn find_references(entity_id: &str, snapshot: &Snapshot) -> ReferenceMap {
        let mut refs = ReferenceMap::new();
        for state in snapshot.states() {
            let kind = match state.domain() {
                "scene" => ReferenceKind::Scene,
                "group" => ReferenceKind::Group,
                "script" => ReferenceKind::Script,
                "automation" => ReferenceKind::Automation,
                _ => continue,
            };
            let hit = match kind {
                ReferenceKind::Scene | ReferenceKind::Group => state
                    .attributes
                    .entity_list
                    .iter()
                    .any(|id| id == entity_id),
                ReferenceKind::Script | ReferenceKind::Automation => {
                    state.attributes.raw.to_string().contains(entity_id)
                }
            };
            if hit {
                refs.entry(kind).or_default().push(state.entity_id.clone());
            }
        }
        for ids in refs.values_mut() {
            ids.sort();
        }
        refs
    }

    /// [`find_references`](Self::find_references) plus a config-API
    /// fallback for automations: live automation states don't expose
    /// triggers or actions, so when the live pass finds no automation
    /// hits, each stored automation config is fetched and checked.
    pub async fn find_references_deep<B: Backend>(
        backend: &B,
        entity_id: &str,
        snapshot: &Snapshot,
    ) -> ReferenceMap {
        let mut refs = Self::find_references(entity_id, snapshot);
        if refs.contains_key(&ReferenceKind::Automation) {
            return refs;
        }

        let mut hits = Vec::new();
        for state in snapshot.states().filter(|s| s.domain() == "automation") {
            let Some(config_id) = state.attributes.config_id.as_deref() else {
                continue;
            };
            match backend.get_config(ReferenceKind::Automation, config_id).await {
                Ok(Some(config)) if config.to_string().contains(entity_id) => {
                    hits.push(state.entity_id.clone());
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(automation = state.entity_id, error = %e, "config scan failed");
                }
            }
        }
        if !hits.is_empty() {
            hits.sort();
            refs.insert(ReferenceKind::Automation, hits);
        }
        refs
    }
}

// ── Updater ─────────────────────────────────────────────────────────

/// Outcome buckets for one reference kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct KindReport {
    pub updated: Vec<String>,
    /// `(holder id, error message)` pairs.
    pub failed: Vec<(String, String)>,
}

/// Full propagation report for one rename.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct DependencyReport {
    pub scenes: KindReport,
    pub scripts: KindReport,
    pub automations: KindReport,
    /// Groups are discovered but never rewritten (their membership
    /// lives in YAML packages outside the config API).
    pub groups_found: Vec<String>,
}

impl DependencyReport {
    #[must_use]
    pub fn total_updated(&self) -> usize {
        self.scenes.updated.len() + self.scripts.updated.len() + self.automations.updated.len()
    }

    #[must_use]
    pub fn total_failed(&self) -> usize {
        self.scenes.failed.len() + self.scripts.failed.len() + self.automations.failed.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.total_failed() == 0
    }

    fn bucket_mut(&mut self, kind: ReferenceKind) -> &mut KindReport {
        match kind {
            ReferenceKind::Scene => &mut self.scenes,
            ReferenceKind::Script => &mut self.scripts,
            ReferenceKind::Automation => &mut self.automations,
            ReferenceKind::Group => unreachable!("groups are find-only"),
        }
    }
}

pub struct DependencyUpdater;

impl DependencyUpdater {
    /// Rewrite every stored config that references `old_id` to use
    /// `new_id`. Each holder is handled independently; one failure
    /// never blocks the rest, and the report carries both buckets.
    pub async fn update_all<B: Backend>(
        backend: &B,
        snapshot: &Snapshot,
        old_id: &str,
        new_id: &str,
    ) -> DependencyReport {
        let refs = DependencyScanner::find_references_deep(backend, old_id, snapshot).await;
        let mut report = DependencyReport::default();

        for (kind, holders) in refs {
            if kind == ReferenceKind::Group {
                report.groups_found = holders;
                continue;
            }
            for holder in holders {
                match Self::rewrite_holder(backend, snapshot, kind, &holder, old_id, new_id).await
                {
                    Ok(true) => report.bucket_mut(kind).updated.push(holder),
                    Ok(false) => {
                        debug!(holder, %kind, "no textual occurrence in stored config");
                    }
                    Err(e) => report.bucket_mut(kind).failed.push((holder, e.to_string())),
                }
            }
        }
        report
    }

    /// Returns `Ok(true)` when a changed config was written back.
    async fn rewrite_holder<B: Backend>(
        backend: &B,
        snapshot: &Snapshot,
        kind: ReferenceKind,
        holder: &str,
        old_id: &str,
        new_id: &str,
    ) -> Result<bool, CoreError> {
        let config_id = holder_config_id(kind, holder, snapshot).ok_or_else(|| {
            CoreError::validation(format!("{holder} has no editable stored config"))
        })?;

        let config = backend
            .get_config(kind, &config_id)
            .await?
            .ok_or_else(|| {
                CoreError::validation(format!("{holder} is YAML-managed, edit it manually"))
            })?;

        let serialized = config.to_string();
        if !serialized.contains(old_id) {
            return Ok(false);
        }
        let rewritten = serialized.replace(old_id, new_id);
        let updated: Value =
            serde_json::from_str(&rewritten).map_err(|e| CoreError::Internal(e.to_string()))?;

        backend.update_config(kind, &config_id, &updated).await?;
        debug!(holder, %kind, old_id, new_id, "rewrote stored config");
        Ok(true)
    }
}

/// Storage config id for a holder entity: scripts use the object id,
/// scenes and automations carry a numeric id attribute on their state.
fn holder_config_id(kind: ReferenceKind, holder: &str, snapshot: &Snapshot) -> Option<String> {
    match kind {
        ReferenceKind::Script => holder.split_once('.').map(|(_, o)| o.to_string()),
        ReferenceKind::Scene | ReferenceKind::Automation => snapshot
            .state(holder)
            .and_then(|s: &State| s.attributes.config_id.clone()),
        ReferenceKind::Group => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attributes;
    use serde_json::json;

    fn state(entity_id: &str, attrs: Value) -> State {
        State {
            entity_id: entity_id.into(),
            state: "on".into(),
            attributes: Attributes::from_raw(attrs),
        }
    }

    fn snap() -> Snapshot {
        Snapshot::new(
            vec![],
            vec![],
            vec![],
            vec![
                state(
                    "scene.abend",
                    json!({ "entity_id": ["light.bad_decke", "light.flur"], "id": "100" }),
                ),
                state("group.downstairs", json!({ "entity_id": ["light.bad_decke"] })),
                state(
                    "script.gute_nacht",
                    json!({ "last_triggered": null, "sequence_summary": "light.bad_decke off" }),
                ),
                state("automation.morgens", json!({ "id": "200", "mode": "single" })),
                state("light.bad_decke", json!({ "friendly_name": "Bad Decke" })),
            ],
        )
    }

    #[test]
    fn finds_scene_group_and_script_references() {
        let refs = DependencyScanner::find_references("light.bad_decke", &snap());
        assert_eq!(refs[&ReferenceKind::Scene], vec!["scene.abend"]);
        assert_eq!(refs[&ReferenceKind::Group], vec!["group.downstairs"]);
        assert_eq!(refs[&ReferenceKind::Script], vec!["script.gute_nacht"]);
        assert!(!refs.contains_key(&ReferenceKind::Automation));
    }

    #[test]
    fn no_references_is_empty_map() {
        let refs = DependencyScanner::find_references("sensor.unreferenced", &snap());
        assert!(refs.is_empty());
    }

    #[test]
    fn script_config_id_is_object_id() {
        assert_eq!(
            holder_config_id(ReferenceKind::Script, "script.gute_nacht", &snap()),
            Some("gute_nacht".to_string())
        );
    }

    #[test]
    fn scene_config_id_from_state_attribute() {
        assert_eq!(
            holder_config_id(ReferenceKind::Scene, "scene.abend", &snap()),
            Some("100".to_string())
        );
    }
}
