//! Deterministic name and entity-id generation.
//!
//! The generated display name is `{area} {device base} {basename}` with
//! user overrides layered in at each level; the entity id is the slug of
//! that name under the entity's domain. Generation is a pure function of
//! the snapshot plus the override store, so running it twice yields the
//! same result and already-conventional names pass through unchanged.

use crate::model::{Device, Entity, State, UNASSIGNED_AREA};
use crate::overrides::{OverrideScope, OverrideStore};
use crate::resolve::ResolvedArea;

/// Outcome of name generation for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub new_id: String,
    pub new_name: String,
    /// Basename after override layering; what the user edits.
    pub basename: String,
    /// Whether an entity-level override supplied the basename.
    pub has_override: bool,
}

pub struct NameGenerator<'a> {
    overrides: &'a dyn OverrideStore,
}

impl<'a> NameGenerator<'a> {
    #[must_use]
    pub fn new(overrides: &'a dyn OverrideStore) -> Self {
        Self { overrides }
    }

    /// Area display name with an area override layered in. `None` for
    /// the unassigned sentinel, which never prefixes names.
    fn area_display(&self, area: &ResolvedArea) -> Option<String> {
        let id = area.id.as_deref()?;
        Some(
            self.overrides
                .get(OverrideScope::Area, id)
                .unwrap_or_else(|| area.name.clone()),
        )
    }

    /// Device basename before overrides: the device's display name with
    /// the area prefix stripped (case-insensitive).
    fn device_base_raw(device: &Device, area_display: Option<&str>) -> String {
        let display = device.display_name();
        match area_display.and_then(|a| strip_prefix_ci(display, a)) {
            Some(rest) if !rest.is_empty() => rest.to_string(),
            _ => display.to_string(),
        }
    }

    /// Suggested display name for a device group, override layered in.
    #[must_use]
    pub fn device_suggestion(&self, device: &Device, area: &ResolvedArea) -> String {
        let area_display = self.area_display(area);
        let base = self
            .overrides
            .get(OverrideScope::Device, &device.id)
            .unwrap_or_else(|| Self::device_base_raw(device, area_display.as_deref()));
        match area_display {
            Some(a) => format!("{a} {base}"),
            None => base,
        }
    }

    /// Generate the proposed id and display name for one entity.
    #[must_use]
    pub fn generate(
        &self,
        entity: &Entity,
        state: Option<&State>,
        device: Option<&Device>,
        area: &ResolvedArea,
    ) -> Proposal {
        let area_display = self.area_display(area);
        let friendly = current_display_name(entity, state);

        // Strip candidates use PRE-override device names, so a freshly
        // set override does not stop the old prefix from being found.
        let mut candidates: Vec<String> = Vec::new();
        if let Some(device) = device {
            let raw_base = Self::device_base_raw(device, area_display.as_deref());
            if let Some(a) = &area_display {
                candidates.push(format!("{a} {raw_base}"));
            }
            candidates.push(device.display_name().to_string());
            candidates.push(raw_base);
        }
        if let Some(a) = &area_display {
            candidates.push(a.clone());
        }
        candidates.sort_by_key(|c| std::cmp::Reverse(c.len()));

        let stripped = candidates
            .iter()
            .find_map(|c| strip_prefix_ci(friendly, c))
            .unwrap_or(friendly)
            .to_string();

        let (basename, has_override) =
            match self.overrides.get(OverrideScope::Entity, &entity.registry_id) {
                Some(name) => (name, true),
                None => (stripped, false),
            };

        let prefix = match device {
            Some(device) => self.device_suggestion(device, area),
            None => area_display.unwrap_or_default(),
        };

        let new_name = format!("{prefix} {basename}").trim().to_string();
        let new_name = if new_name.is_empty() {
            friendly.to_string()
        } else {
            new_name
        };
        let new_id = format!("{}.{}", entity.domain(), slugify(&new_name));

        Proposal {
            new_id,
            new_name,
            basename,
            has_override,
        }
    }
}

/// Display name currently attached to an entity, checked in the order
/// the backend itself resolves it.
#[must_use]
pub fn current_display_name<'e>(entity: &'e Entity, state: Option<&'e State>) -> &'e str {
    if let Some(state) = state {
        return state.friendly_name();
    }
    entity
        .name
        .as_deref()
        .or(entity.original_name.as_deref())
        .unwrap_or(&entity.entity_id)
}

/// Strip `prefix` from the start of `s` case-insensitively. Only matches
/// at a word boundary: the remainder must be empty or start with a
/// space. Returns the trimmed remainder.
pub(crate) fn strip_prefix_ci<'s>(s: &'s str, prefix: &str) -> Option<&'s str> {
    if prefix.is_empty() || s.len() < prefix.len() {
        return None;
    }
    let (head, rest) = s.split_at_checked(prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    if rest.is_empty() || rest.starts_with(' ') {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Lowercased slug: diacritics folded to ASCII, every run of
/// non-alphanumeric characters collapsed to a single `_`.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_sep = false;
    for c in input.chars().flat_map(char::to_lowercase) {
        let folded = fold_diacritic(c);
        match folded {
            Some(s) => {
                if pending_sep && !out.is_empty() {
                    out.push('_');
                }
                pending_sep = false;
                out.push_str(s);
            }
            None if c.is_ascii_alphanumeric() => {
                if pending_sep && !out.is_empty() {
                    out.push('_');
                }
                pending_sep = false;
                out.push(c);
            }
            None => pending_sep = true,
        }
    }
    out
}

fn fold_diacritic(c: char) -> Option<&'static str> {
    Some(match c {
        'ä' | 'à' | 'á' | 'â' | 'ã' | 'å' => "a",
        'ö' | 'ò' | 'ó' | 'ô' | 'õ' => "o",
        'ü' | 'ù' | 'ú' | 'û' => "u",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ß' => "ss",
        'ç' => "c",
        'ñ' => "n",
        _ => return None,
    })
}

/// Sentinel-aware helper: whether a resolved area carries a real area.
#[must_use]
pub fn is_unassigned(area_name: &str) -> bool {
    area_name == UNASSIGNED_AREA
}
