//! Canonical domain types.
//!
//! Converted once from the raw `tidyhaus-api` payloads at the snapshot
//! boundary; everything above this layer works with these types only.

pub mod reference;
pub mod state;
pub mod structure;

pub use reference::ReferenceKind;
pub use state::{Attributes, State};
pub use structure::{Area, Device, Entity, entity_domain};

/// Sentinel area name for entities no cascade tier could place.
pub const UNASSIGNED_AREA: &str = "Unassigned";

/// Label stamped on every entity touched by an execute run.
/// `skip_reviewed` previews filter on it.
pub const MAINTAINED_LABEL: &str = "maintained";
