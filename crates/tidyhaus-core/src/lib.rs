//! Reconciliation engine between `tidyhaus-api` and UI consumers (CLI).
//!
//! This crate owns the business logic and domain model for coordinated
//! entity renaming:
//!
//! - **[`Restructurer`]** — Top-level facade: builds a [`Snapshot`], runs
//!   the area resolver and name generator over a selected subset to
//!   produce a cached *preview*, then applies a user-confirmed selection
//!   in an *execute* phase with per-item result classification.
//!
//! - **[`AreaResolver`]** — Assigns every entity to exactly one area via
//!   a layered fallback cascade (registry, attributes, device-token
//!   matching, lexical), defaulting to the "Unassigned" sentinel.
//!
//! - **[`NameGenerator`]** — Deterministic, idempotent derivation of
//!   `{area} {device} {basename}` display names and the matching slugged
//!   entity ids, layered with user overrides from an [`OverrideStore`].
//!
//! - **Dependency scanning** ([`scan`]) — Finds and rewrites references
//!   to a renamed identifier inside scenes, groups, scripts, and
//!   automations.
//!
//! - **[`Backend`]** — The collaborator interface to the home-automation
//!   instance; [`HomeAssistantBackend`] composes the `tidyhaus-api`
//!   REST + registry clients.

pub mod backend;
pub mod convert;
pub mod error;
pub mod model;
pub mod naming;
pub mod overrides;
pub mod resolve;
pub mod restructure;
pub mod scan;
pub mod snapshot;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{Backend, BackendConfig, EntityChange, HomeAssistantBackend, Structure};
pub use error::CoreError;
pub use naming::{NameGenerator, Proposal};
pub use overrides::{JsonOverrideStore, MemoryOverrideStore, OverrideScope, OverrideStore};
pub use resolve::{AreaResolver, ResolvedArea};
pub use restructure::{
    AreaSummary, DeviceGroup, DeviceSelection, ExecuteReport, ExecuteSelection, FailedItem,
    PreviewOptions, PreviewResult, ProposedChange, RenamedDevice, RenamedEntity, Restructurer,
    SkippedItem, StatsSummary,
};
pub use scan::{DependencyReport, DependencyScanner, DependencyUpdater, KindReport, ReferenceMap};
pub use snapshot::Snapshot;

pub use model::{
    Area, Attributes, Device, Entity, MAINTAINED_LABEL, ReferenceKind, State, UNASSIGNED_AREA,
};

// Transport knobs consumers need to build a [`BackendConfig`].
pub use tidyhaus_api::{TlsMode, TransportConfig};
