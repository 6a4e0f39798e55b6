//! The restructuring orchestrator.
//!
//! [`Restructurer`] ties the pieces together: it takes a snapshot, runs
//! the resolver and generator over a selected slice of the registry to
//! build a cached preview, and later applies a user-confirmed selection
//! of that preview in an execute pass with per-item result buckets.
//!
//! Previews are single-use: execute consumes the cache entry whether or
//! not every item succeeded, so a stale plan can never be replayed
//! against a registry that has moved on.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::backend::{Backend, EntityChange};
use crate::error::CoreError;
use crate::model::{Device, Entity, MAINTAINED_LABEL, UNASSIGNED_AREA};
use crate::naming::{NameGenerator, current_display_name, strip_prefix_ci};
use crate::overrides::{OverrideScope, OverrideStore};
use crate::resolve::{AreaResolver, ResolvedArea};
use crate::scan::{DependencyScanner, DependencyUpdater, ReferenceMap};
use crate::snapshot::Snapshot;

// ── Preview types ───────────────────────────────────────────────────

/// Parameters for a preview pass.
#[derive(Debug, Clone, Default)]
pub struct PreviewOptions {
    /// Area name (or area id). Required.
    pub area: String,
    /// Entity domain, or `"all"`. Required.
    pub domain: String,
    /// Drop entities already carrying the "maintained" label.
    pub skip_reviewed: bool,
    /// Drop entities whose generated name matches the current one, and
    /// then any group left empty.
    pub only_changes: bool,
    /// Include disabled registry entities.
    pub show_disabled: bool,
}

/// One entity's proposed rename inside a preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposedChange {
    pub old_id: String,
    pub new_id: String,
    pub current_name: String,
    pub new_name: String,
    /// Id or display name would change.
    pub needs_rename: bool,
    pub device_id: Option<String>,
    pub registry_id: String,
    pub has_override: bool,
    pub override_name: Option<String>,
    pub disabled_by: Option<String>,
    /// Basename the generator derived; the part an override would edit.
    pub current_basename: String,
}

/// Entities grouped by their device; device-less entities share the
/// trailing ungrouped bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceGroup {
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub suggested_device_name: Option<String>,
    pub device_needs_rename: bool,
    pub entities: Vec<ProposedChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewResult {
    /// Cache key, `"{area}_{domain}"`.
    pub preview_id: String,
    pub area: String,
    pub domain: String,
    pub groups: Vec<DeviceGroup>,
}

impl PreviewResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.entities.is_empty())
    }

    #[must_use]
    pub fn total_entities(&self) -> usize {
        self.groups.iter().map(|g| g.entities.len()).sum()
    }

    #[must_use]
    pub fn total_renames(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| &g.entities)
            .filter(|e| e.needs_rename)
            .count()
    }
}

#[derive(Debug, Clone)]
struct MappingEntry {
    new_id: String,
    new_name: String,
    /// Set by [`Restructurer::update_mapping`]; edited values win over
    /// the execute-time recompute.
    edited: bool,
}

#[derive(Debug, Clone)]
struct CachedPreview {
    result: PreviewResult,
    mapping: BTreeMap<String, MappingEntry>,
}

// ── Execute types ───────────────────────────────────────────────────

/// A device rename confirmed by the user.
#[derive(Debug, Clone)]
pub struct DeviceSelection {
    pub device_id: String,
    pub new_name: String,
}

/// User-confirmed subset of a preview.
#[derive(Debug, Clone, Default)]
pub struct ExecuteSelection {
    pub preview_id: String,
    /// Old entity ids to process.
    pub entities: Vec<String>,
    pub devices: Vec<DeviceSelection>,
    /// Re-enable disabled entities as part of their rename.
    pub enable_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedEntity {
    pub old_id: String,
    pub new_id: String,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedDevice {
    pub device_id: String,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub id: String,
    pub reason: String,
}

/// Per-item outcome buckets for one execute pass. Buckets are
/// independent and append-only; a batch never fails as a whole.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecuteReport {
    pub success: Vec<RenamedEntity>,
    pub failed: Vec<FailedItem>,
    pub skipped: Vec<SkippedItem>,
    pub dependency_warnings: Vec<String>,
    pub device_success: Vec<RenamedDevice>,
    pub device_failed: Vec<FailedItem>,
}

// ── Reporting types for the supplemental operations ─────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaSummary {
    /// `None` for the unassigned bucket.
    pub id: Option<String>,
    pub name: String,
    /// Name with an area override layered in.
    pub display_name: String,
    pub entity_count: usize,
    /// Entity count per domain.
    pub domains: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total_entities: usize,
    pub area_count: usize,
    pub domains: BTreeMap<String, usize>,
}

// ── Restructurer ────────────────────────────────────────────────────

pub struct Restructurer<B, O> {
    backend: B,
    overrides: O,
    previews: DashMap<String, CachedPreview>,
    execute_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<B: Backend, O: OverrideStore> Restructurer<B, O> {
    pub fn new(backend: B, overrides: O) -> Self {
        Self {
            backend,
            overrides,
            previews: DashMap::new(),
            execute_locks: DashMap::new(),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn overrides(&self) -> &O {
        &self.overrides
    }

    async fn snapshot(&self) -> Result<Snapshot, CoreError> {
        let structure = self.backend.structure().await?;
        let states = self.backend.states().await?;
        Ok(Snapshot::new(
            structure.areas,
            structure.devices,
            structure.entities,
            states,
        ))
    }

    fn generator(&self) -> NameGenerator<'_> {
        NameGenerator::new(&self.overrides)
    }

    // ── Preview ─────────────────────────────────────────────────────

    /// Build and cache a rename preview for one area/domain slice.
    ///
    /// An empty candidate set yields an empty result and caches
    /// nothing; a repeated preview under the same key overwrites the
    /// cached entry.
    #[allow(clippy::too_many_lines)]
    pub async fn preview(&self, options: &PreviewOptions) -> Result<PreviewResult, CoreError> {
        if options.area.trim().is_empty() {
            return Err(CoreError::validation("area must not be empty"));
        }
        if options.domain.trim().is_empty() {
            return Err(CoreError::validation("domain must not be empty"));
        }

        let snapshot = self.snapshot().await?;
        let generator = self.generator();
        let preview_id = format!("{}_{}", options.area, options.domain);

        // Collect candidates with their resolved areas.
        let mut selected: Vec<(&Entity, ResolvedArea)> = Vec::new();
        for entity in snapshot.entities() {
            if options.domain != "all" && entity.domain() != options.domain {
                continue;
            }
            if entity.is_disabled() && !options.show_disabled {
                continue;
            }
            if options.skip_reviewed && entity.labels.contains(MAINTAINED_LABEL) {
                continue;
            }
            let resolved = AreaResolver::resolve(entity, snapshot.state(&entity.entity_id), &snapshot);
            let matches = resolved.name.eq_ignore_ascii_case(&options.area)
                || resolved.id.as_deref() == Some(options.area.as_str());
            if matches {
                selected.push((entity, resolved));
            }
        }

        if selected.is_empty() {
            debug!(area = options.area, domain = options.domain, "empty preview");
            return Ok(PreviewResult {
                preview_id,
                area: options.area.clone(),
                domain: options.domain.clone(),
                groups: Vec::new(),
            });
        }

        // Group by device.
        let mut by_device: BTreeMap<Option<String>, Vec<(&Entity, ResolvedArea)>> =
            BTreeMap::new();
        for (entity, resolved) in selected {
            by_device
                .entry(entity.device_id.clone())
                .or_default()
                .push((entity, resolved));
        }

        let mut mapping = BTreeMap::new();
        let mut groups = Vec::new();
        for (device_id, members) in by_device {
            let device = device_id.as_deref().and_then(|id| snapshot.device(id));

            let mut entities = Vec::new();
            for (entity, resolved) in members {
                let state = snapshot.state(&entity.entity_id);
                let proposal = generator.generate(entity, state, device, &resolved);
                let current_name = current_display_name(entity, state).to_string();
                let needs_rename =
                    proposal.new_id != entity.entity_id || proposal.new_name != current_name;

                if needs_rename {
                    mapping.insert(
                        entity.entity_id.clone(),
                        MappingEntry {
                            new_id: proposal.new_id.clone(),
                            new_name: proposal.new_name.clone(),
                            edited: false,
                        },
                    );
                }
                entities.push(ProposedChange {
                    old_id: entity.entity_id.clone(),
                    new_id: proposal.new_id,
                    current_name,
                    new_name: proposal.new_name,
                    needs_rename,
                    device_id: entity.device_id.clone(),
                    registry_id: entity.registry_id.clone(),
                    has_override: proposal.has_override,
                    override_name: self
                        .overrides
                        .get(OverrideScope::Entity, &entity.registry_id),
                    disabled_by: entity.disabled_by.clone(),
                    current_basename: proposal.basename,
                });
            }

            if options.only_changes {
                entities.retain(|e| e.needs_rename);
                if entities.is_empty() {
                    continue;
                }
            }
            // Non-renaming entities first, then by old id.
            entities.sort_by(|a, b| {
                a.needs_rename
                    .cmp(&b.needs_rename)
                    .then_with(|| a.old_id.cmp(&b.old_id))
            });

            let (device_name, suggested_device_name) = match device {
                Some(device) => {
                    let resolved = device
                        .area_id
                        .as_deref()
                        .and_then(|id| snapshot.area(id))
                        .map_or_else(ResolvedArea::unassigned, ResolvedArea::from_area);
                    (
                        Some(device.display_name().to_string()),
                        Some(generator.device_suggestion(device, &resolved)),
                    )
                }
                None => (None, None),
            };
            let device_needs_rename = matches!(
                (&device_name, &suggested_device_name),
                (Some(current), Some(suggested)) if current != suggested
            );

            groups.push(DeviceGroup {
                device_id,
                device_name,
                suggested_device_name,
                device_needs_rename,
                entities,
            });
        }

        // Device groups alphabetically, the ungrouped bucket last.
        groups.sort_by(|a, b| match (&a.device_name, &b.device_name) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        let result = PreviewResult {
            preview_id: preview_id.clone(),
            area: options.area.clone(),
            domain: options.domain.clone(),
            groups,
        };
        if result.is_empty() {
            return Ok(result);
        }

        info!(
            preview_id,
            entities = result.total_entities(),
            renames = result.total_renames(),
            "preview cached"
        );
        self.previews.insert(
            preview_id,
            CachedPreview {
                result: result.clone(),
                mapping,
            },
        );
        Ok(result)
    }

    /// Edit one cached mapping entry before execute.
    pub fn update_mapping(
        &self,
        preview_id: &str,
        old_id: &str,
        new_id: &str,
        new_name: &str,
    ) -> Result<(), CoreError> {
        let mut cached = self
            .previews
            .get_mut(preview_id)
            .ok_or_else(|| CoreError::PreviewNotFound {
                preview_id: preview_id.to_string(),
            })?;

        let old_domain = old_id.split_once('.').map(|(d, _)| d);
        match new_id.split_once('.') {
            Some((domain, object)) if Some(domain) == old_domain && !object.is_empty() => {}
            _ => {
                return Err(CoreError::validation(format!(
                    "new id '{new_id}' must keep the '{}' domain",
                    old_domain.unwrap_or("?")
                )));
            }
        }

        let entry = cached
            .mapping
            .get_mut(old_id)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "mapping entry".to_string(),
                identifier: old_id.to_string(),
            })?;
        entry.new_id = new_id.to_string();
        entry.new_name = new_name.to_string();
        entry.edited = true;

        for group in &mut cached.result.groups {
            if let Some(change) = group.entities.iter_mut().find(|e| e.old_id == old_id) {
                change.new_id = new_id.to_string();
                change.new_name = new_name.to_string();
                change.needs_rename = true;
            }
        }
        debug!(preview_id, old_id, new_id, "mapping entry edited");
        Ok(())
    }

    // ── Execute ─────────────────────────────────────────────────────

    /// Apply a confirmed selection of a cached preview.
    ///
    /// Devices are renamed first so the entity pass sees the new device
    /// names; the cache entry is consumed unconditionally at the end.
    pub async fn execute(&self, selection: &ExecuteSelection) -> Result<ExecuteReport, CoreError> {
        let preview_id = selection.preview_id.clone();

        let lock = self
            .execute_locks
            .entry(preview_id.clone())
            .or_default()
            .clone();
        let Ok(_guard) = lock.try_lock_owned() else {
            return Err(CoreError::validation(format!(
                "an execute for preview '{preview_id}' is already running"
            )));
        };

        let Some(cached) = self.previews.get(&preview_id).map(|entry| entry.clone()) else {
            self.execute_locks.remove(&preview_id);
            return Err(CoreError::PreviewNotFound {
                preview_id: preview_id.clone(),
            });
        };

        if selection.entities.is_empty() && selection.devices.is_empty() {
            self.execute_locks.remove(&preview_id);
            return Err(CoreError::validation("nothing selected"));
        }

        let mut snapshot = match self.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.execute_locks.remove(&preview_id);
                return Err(e);
            }
        };
        let mut report = ExecuteReport::default();

        // The plan is the preview: selected ids that were never part of
        // it are recorded, not processed.
        let in_preview: HashSet<&str> = cached
            .result
            .groups
            .iter()
            .flat_map(|g| &g.entities)
            .map(|e| e.old_id.as_str())
            .collect();
        let mut entities: Vec<&str> = Vec::new();
        for id in &selection.entities {
            if in_preview.contains(id.as_str()) {
                entities.push(id);
            } else {
                report.skipped.push(SkippedItem {
                    id: id.clone(),
                    reason: "not part of the preview".to_string(),
                });
            }
        }
        let selected: HashSet<&str> = entities.iter().copied().collect();
        let mut handled: HashSet<String> = HashSet::new();

        // Device pass.
        for device in &selection.devices {
            match self.backend.rename_device(&device.device_id, &device.new_name).await {
                Ok(true) => {
                    // Persist the override first so member recomputes
                    // pick up the new basename, but leave the snapshot's
                    // device name untouched until they are done: the
                    // generator strips prefixes against the old name.
                    self.persist_device_override(&snapshot, &device.device_id, &device.new_name);
                    report.device_success.push(RenamedDevice {
                        device_id: device.device_id.clone(),
                        new_name: device.new_name.clone(),
                    });

                    let members: Vec<String> = snapshot
                        .entities_for_device(&device.device_id)
                        .map(|e| e.entity_id.clone())
                        .filter(|id| selected.contains(id.as_str()))
                        .collect();
                    for old_id in members {
                        self.execute_entity(&snapshot, &cached, &old_id, selection, &mut report)
                            .await;
                        handled.insert(old_id);
                    }
                    snapshot.set_device_name(&device.device_id, &device.new_name);
                }
                Ok(false) => report.device_failed.push(FailedItem {
                    id: device.device_id.clone(),
                    error: "rename rejected by the registry".to_string(),
                }),
                Err(e) => report.device_failed.push(FailedItem {
                    id: device.device_id.clone(),
                    error: e.to_string(),
                }),
            }
        }

        // Entity pass.
        for old_id in entities {
            if handled.contains(old_id) {
                continue;
            }
            self.execute_entity(&snapshot, &cached, old_id, selection, &mut report)
                .await;
        }

        // Single use: the plan is spent whether or not items failed.
        self.previews.remove(&preview_id);
        self.execute_locks.remove(&preview_id);
        info!(
            preview_id,
            renamed = report.success.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "execute finished"
        );
        Ok(report)
    }

    /// Process one selected entity, classifying the outcome into the
    /// report buckets.
    async fn execute_entity(
        &self,
        snapshot: &Snapshot,
        cached: &CachedPreview,
        old_id: &str,
        selection: &ExecuteSelection,
        report: &mut ExecuteReport,
    ) {
        let Some(entity) = snapshot.entity(old_id) else {
            report.failed.push(FailedItem {
                id: old_id.to_string(),
                error: "no longer present in the registry".to_string(),
            });
            return;
        };

        // A manually edited mapping entry wins; otherwise recompute
        // against the (possibly device-patched) snapshot.
        let (new_id, new_name) = match cached.mapping.get(old_id) {
            Some(entry) if entry.edited => (entry.new_id.clone(), entry.new_name.clone()),
            _ => {
                let state = snapshot.state(old_id);
                let device = entity.device_id.as_deref().and_then(|id| snapshot.device(id));
                let resolved = AreaResolver::resolve(entity, state, snapshot);
                let proposal = self.generator().generate(entity, state, device, &resolved);
                (proposal.new_id, proposal.new_name)
            }
        };

        let state = snapshot.state(old_id);
        let current_name = current_display_name(entity, state);
        let id_changes = new_id != old_id;
        if !id_changes && new_name == current_name {
            // Label-only: a conventional entity still gets stamped so
            // skip_reviewed previews stop re-listing it.
            if !entity.labels.contains(MAINTAINED_LABEL) {
                let mut labels: Vec<String> = entity.labels.iter().cloned().collect();
                labels.push(MAINTAINED_LABEL.to_string());
                if let Err(e) = self.backend.set_labels(old_id, labels).await {
                    warn!(old_id, error = %e, "label update failed");
                    report
                        .dependency_warnings
                        .push(format!("{old_id}: label update failed: {e}"));
                }
            }
            report.skipped.push(SkippedItem {
                id: old_id.to_string(),
                reason: "already matches the convention".to_string(),
            });
            return;
        }

        let enable = selection.enable_disabled && entity.is_disabled();
        match self
            .apply_entity_change(snapshot, entity, &new_id, &new_name, enable, report)
            .await
        {
            Ok(()) => report.success.push(RenamedEntity {
                old_id: old_id.to_string(),
                new_id,
                new_name,
            }),
            Err(e) => report.failed.push(FailedItem {
                id: old_id.to_string(),
                error: e.to_string(),
            }),
        }
    }

    /// Push one entity change to the backend: registry update, the
    /// "maintained" label, and dependency propagation on id changes.
    /// Label and dependency problems degrade to warnings.
    async fn apply_entity_change(
        &self,
        snapshot: &Snapshot,
        entity: &Entity,
        new_id: &str,
        new_name: &str,
        enable: bool,
        report: &mut ExecuteReport,
    ) -> Result<(), CoreError> {
        let old_id = entity.entity_id.as_str();
        let id_changes = new_id != old_id;

        let change = EntityChange {
            new_entity_id: id_changes.then(|| new_id.to_string()),
            name: Some(new_name.to_string()),
            enable,
        };
        self.backend.update_entity(old_id, &change).await?;
        info!(old_id, new_id, new_name, "entity updated");

        let mut labels: Vec<String> = entity.labels.iter().cloned().collect();
        if !labels.iter().any(|l| l == MAINTAINED_LABEL) {
            labels.push(MAINTAINED_LABEL.to_string());
        }
        if let Err(e) = self.backend.set_labels(new_id, labels).await {
            warn!(new_id, error = %e, "label update failed");
            report
                .dependency_warnings
                .push(format!("{new_id}: label update failed: {e}"));
        }

        if id_changes {
            let deps =
                DependencyUpdater::update_all(&self.backend, snapshot, old_id, new_id).await;
            for (holder, error) in deps
                .scenes
                .failed
                .iter()
                .chain(&deps.scripts.failed)
                .chain(&deps.automations.failed)
            {
                report
                    .dependency_warnings
                    .push(format!("{holder}: still references {old_id}: {error}"));
            }
            for group in &deps.groups_found {
                report.dependency_warnings.push(format!(
                    "{group} references {old_id} in YAML; update it manually"
                ));
            }
            if deps.total_updated() > 0 {
                debug!(old_id, new_id, updated = deps.total_updated(), "dependencies rewritten");
            }
        }
        Ok(())
    }

    fn persist_device_override(&self, snapshot: &Snapshot, device_id: &str, new_name: &str) {
        let area_display = snapshot
            .device(device_id)
            .and_then(|d| d.area_id.as_deref())
            .and_then(|id| snapshot.area(id))
            .map(|area| {
                self.overrides
                    .get(OverrideScope::Area, &area.id)
                    .unwrap_or_else(|| area.name.clone())
            });
        let basename = area_display
            .as_deref()
            .and_then(|a| strip_prefix_ci(new_name, a))
            .filter(|rest| !rest.is_empty())
            .unwrap_or(new_name);
        if let Err(e) = self
            .overrides
            .set(OverrideScope::Device, device_id, basename)
        {
            warn!(device_id, error = %e, "device override not persisted");
        }
    }

    // ── Standalone device rename ────────────────────────────────────

    /// Rename a device outside any preview, persisting the matching
    /// device override.
    pub async fn rename_device(&self, device_id: &str, new_name: &str) -> Result<(), CoreError> {
        if new_name.trim().is_empty() {
            return Err(CoreError::validation("device name must not be empty"));
        }
        let snapshot = self.snapshot().await?;
        if snapshot.device(device_id).is_none() {
            return Err(CoreError::NotFound {
                entity_type: "device".to_string(),
                identifier: device_id.to_string(),
            });
        }
        if self.backend.rename_device(device_id, new_name).await? {
            self.persist_device_override(&snapshot, device_id, new_name);
            Ok(())
        } else {
            Err(CoreError::RegistryMutation {
                target: device_id.to_string(),
                message: "rename rejected by the registry".to_string(),
            })
        }
    }

    // ── Dependency inspection ───────────────────────────────────────

    /// Find-only dependency scan for one entity id.
    pub async fn dependencies(&self, entity_id: &str) -> Result<ReferenceMap, CoreError> {
        let snapshot = self.snapshot().await?;
        Ok(DependencyScanner::find_references_deep(&self.backend, entity_id, &snapshot).await)
    }

    // ── Area summaries & stats ──────────────────────────────────────

    /// Per-area entity organization: counts and domain breakdowns, with
    /// area overrides layered into the display names. Unassigned last.
    pub async fn areas(&self) -> Result<Vec<AreaSummary>, CoreError> {
        let snapshot = self.snapshot().await?;

        let mut summaries: BTreeMap<String, AreaSummary> = snapshot
            .areas()
            .map(|area| {
                (
                    area.name.clone(),
                    AreaSummary {
                        id: Some(area.id.clone()),
                        name: area.name.clone(),
                        display_name: self
                            .overrides
                            .get(OverrideScope::Area, &area.id)
                            .unwrap_or_else(|| area.name.clone()),
                        entity_count: 0,
                        domains: BTreeMap::new(),
                    },
                )
            })
            .collect();
        let mut unassigned = AreaSummary {
            id: None,
            name: UNASSIGNED_AREA.to_string(),
            display_name: UNASSIGNED_AREA.to_string(),
            entity_count: 0,
            domains: BTreeMap::new(),
        };

        for entity in snapshot.entities() {
            let resolved =
                AreaResolver::resolve(entity, snapshot.state(&entity.entity_id), &snapshot);
            let summary = match resolved.id {
                Some(_) => match summaries.get_mut(&resolved.name) {
                    Some(s) => s,
                    None => &mut unassigned,
                },
                None => &mut unassigned,
            };
            summary.entity_count += 1;
            *summary.domains.entry(entity.domain().to_string()).or_insert(0) += 1;
        }

        let mut out: Vec<AreaSummary> = summaries.into_values().collect();
        if unassigned.entity_count > 0 {
            out.push(unassigned);
        }
        Ok(out)
    }

    pub async fn stats(&self) -> Result<StatsSummary, CoreError> {
        let snapshot = self.snapshot().await?;
        let mut domains = BTreeMap::new();
        for entity in snapshot.entities() {
            *domains.entry(entity.domain().to_string()).or_insert(0) += 1;
        }
        Ok(StatsSummary {
            total_entities: snapshot.entity_count(),
            area_count: snapshot.area_count(),
            domains,
        })
    }

    // ── Override management ─────────────────────────────────────────

    pub fn set_area_override(&self, area_id: &str, name: &str) -> Result<(), CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::validation("override name must not be empty"));
        }
        self.overrides.set(OverrideScope::Area, area_id, name)
    }

    pub fn remove_area_override(&self, area_id: &str) -> Result<bool, CoreError> {
        self.overrides.remove(OverrideScope::Area, area_id)
    }

    /// Store a device override and return the device's recomputed
    /// suggested display name.
    pub async fn set_device_override(
        &self,
        device_id: &str,
        name: &str,
    ) -> Result<String, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::validation("override name must not be empty"));
        }
        let snapshot = self.snapshot().await?;
        let device = snapshot.device(device_id).ok_or_else(|| CoreError::NotFound {
            entity_type: "device".to_string(),
            identifier: device_id.to_string(),
        })?;
        self.overrides.set(OverrideScope::Device, device_id, name)?;
        Ok(self
            .generator()
            .device_suggestion(device, &device_resolved_area(device, &snapshot)))
    }

    pub fn remove_device_override(&self, device_id: &str) -> Result<bool, CoreError> {
        self.overrides.remove(OverrideScope::Device, device_id)
    }

    /// Store an entity override (keyed by the stable registry id) and
    /// immediately push the recomputed friendly name to the backend.
    pub async fn set_entity_override(
        &self,
        entity_id: &str,
        name: &str,
    ) -> Result<String, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::validation("override name must not be empty"));
        }
        let snapshot = self.snapshot().await?;
        let entity = snapshot.entity(entity_id).ok_or_else(|| CoreError::NotFound {
            entity_type: "entity".to_string(),
            identifier: entity_id.to_string(),
        })?;
        self.overrides
            .set(OverrideScope::Entity, &entity.registry_id, name)?;

        let state = snapshot.state(entity_id);
        let device = entity.device_id.as_deref().and_then(|id| snapshot.device(id));
        let resolved = AreaResolver::resolve(entity, state, &snapshot);
        let proposal = self.generator().generate(entity, state, device, &resolved);

        let change = EntityChange {
            new_entity_id: None,
            name: Some(proposal.new_name.clone()),
            enable: false,
        };
        self.backend.update_entity(entity_id, &change).await?;
        Ok(proposal.new_name)
    }

    pub async fn remove_entity_override(&self, entity_id: &str) -> Result<bool, CoreError> {
        let snapshot = self.snapshot().await?;
        let entity = snapshot.entity(entity_id).ok_or_else(|| CoreError::NotFound {
            entity_type: "entity".to_string(),
            identifier: entity_id.to_string(),
        })?;
        self.overrides
            .remove(OverrideScope::Entity, &entity.registry_id)
    }
}

fn device_resolved_area(device: &Device, snapshot: &Snapshot) -> ResolvedArea {
    device
        .area_id
        .as_deref()
        .and_then(|id| snapshot.area(id))
        .map_or_else(ResolvedArea::unassigned, ResolvedArea::from_area)
}
