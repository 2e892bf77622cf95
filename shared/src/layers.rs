use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::marker::{EntityActivity, ImpactLevel, MarkerKind};

pub const MARKERS: &str = "markers";
pub const ENTITIES: &str = "entities";
pub const ENTITIES_AWAKE: &str = "entities_awake";
pub const ENTITIES_ASLEEP: &str = "entities_asleep";
pub const ENTITIES_FROZEN: &str = "entities_frozen";
pub const COMPONENTS: &str = "components";
pub const CHUNKS: &str = "brickedchunks";

const ALL_IMPACTS: u8 = u8::MAX;

/// Layer visibility toggles keyed by name. Names nobody has set read as off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerFlags {
    flags: BTreeMap<String, bool>,
    component_impacts: u8,
}

impl Default for LayerFlags {
    fn default() -> Self {
        let flags = [
            (MARKERS, true),
            (ENTITIES, true),
            (ENTITIES_AWAKE, true),
            (ENTITIES_ASLEEP, true),
            (ENTITIES_FROZEN, true),
            (COMPONENTS, false),
            (CHUNKS, true),
        ]
        .into_iter()
        .map(|(name, on)| (name.to_string(), on))
        .collect();
        Self {
            flags,
            component_impacts: ALL_IMPACTS,
        }
    }
}

impl LayerFlags {
    pub fn get(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Returns `true` when the stored value changed.
    pub fn set(&mut self, name: &str, on: bool) -> bool {
        self.flags.insert(name.to_string(), on) != Some(on)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(name, on)| (name.as_str(), *on))
    }

    pub fn impact_enabled(&self, level: ImpactLevel) -> bool {
        self.component_impacts & level.bit() != 0
    }

    pub fn set_impact(&mut self, level: ImpactLevel, on: bool) -> bool {
        let before = self.component_impacts;
        if on {
            self.component_impacts |= level.bit();
        } else {
            self.component_impacts &= !level.bit();
        }
        before != self.component_impacts
    }

    pub fn impact_mask(&self) -> u8 {
        self.component_impacts
    }

    /// Category and sub-state toggles for one marker kind.
    pub fn allows(&self, kind: &MarkerKind) -> bool {
        match kind {
            MarkerKind::Entity(state) => {
                if !(self.get(MARKERS) && self.get(ENTITIES)) {
                    return false;
                }
                // Each sub-state toggle hides independently; an entity that is
                // both frozen and asleep needs both layers on.
                if state.frozen && !self.get(ENTITIES_FROZEN) {
                    return false;
                }
                if state.sleeping && !self.get(ENTITIES_ASLEEP) {
                    return false;
                }
                state.activity() != EntityActivity::Awake || self.get(ENTITIES_AWAKE)
            }
            MarkerKind::Component(info) => {
                self.get(MARKERS) && self.get(COMPONENTS) && self.impact_enabled(info.impact)
            }
            MarkerKind::Chunk(_) => self.get(CHUNKS),
            MarkerKind::Generic => self.get(MARKERS),
        }
    }
}
