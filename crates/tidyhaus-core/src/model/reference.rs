// ── Dependency reference kinds ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Where a reference to an entity id can live.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReferenceKind {
    Scene,
    Group,
    Script,
    Automation,
}

impl ReferenceKind {
    /// The entity-id domain prefix that identifies holders of this kind.
    #[must_use]
    pub fn domain(self) -> &'static str {
        match self {
            Self::Scene => "scene",
            Self::Group => "group",
            Self::Script => "script",
            Self::Automation => "automation",
        }
    }

    /// Whether references of this kind can be rewritten through the
    /// storage config API. Groups are YAML-only, so they are find-only.
    #[must_use]
    pub fn is_updatable(self) -> bool {
        !matches!(self, Self::Group)
    }
}
