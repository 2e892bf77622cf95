use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Projected canvas position of a marker, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Owner {
    pub display_name: String,
    pub user_name: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EntityState {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub frozen: bool,
    #[serde(default)]
    pub sleeping: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityActivity {
    Asleep,
    Frozen,
    Awake,
}

impl EntityState {
    /// Frozen wins over sleeping: a frozen body is reported as frozen even if
    /// the physics engine also put it to sleep.
    pub fn activity(&self) -> EntityActivity {
        if self.frozen {
            EntityActivity::Frozen
        } else if self.sleeping {
            EntityActivity::Asleep
        } else {
            EntityActivity::Awake
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ChunkInfo {
    #[serde(default)]
    pub brick_count: u32,
    #[serde(default)]
    pub wire_count: u32,
}

/// Impact level of a logic component, 0 (negligible) through 7 (severe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImpactLevel(u8);

impl ImpactLevel {
    pub const MAX: u8 = 7;

    pub fn new(level: u8) -> Self {
        Self(level.min(Self::MAX))
    }

    pub fn get(self) -> u8 {
        self.0.min(Self::MAX)
    }

    pub fn bit(self) -> u8 {
        1 << self.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ComponentInfo {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub impact: ImpactLevel,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkerKind {
    Entity(EntityState),
    Chunk(ChunkInfo),
    Component(ComponentInfo),
    #[serde(other)]
    Generic,
}

impl MarkerKind {
    /// Paint rank of the category. Lower ranks draw first, so higher ranks sit on top.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Generic => 0,
            Self::Chunk(_) => 1,
            Self::Component(_) => 2,
            Self::Entity(_) => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Chunk(_) => "chunk",
            Self::Component(_) => "component",
            Self::Entity(_) => "entity",
        }
    }
}

/// Injected boundary test, called with world coordinates.
#[derive(Clone)]
pub struct BoundaryFn(Arc<dyn Fn(f64, f64) -> bool + Send + Sync>);

impl BoundaryFn {
    pub fn new(f: impl Fn(f64, f64) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn contains(&self, world_x: f64, world_y: f64) -> bool {
        (self.0)(world_x, world_y)
    }
}

impl fmt::Debug for BoundaryFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoundaryFn(..)")
    }
}

/// Tooltip hit area. Sizes are screen pixels and get divided by the view scale
/// when tested in world space.
#[derive(Debug, Clone)]
pub enum HitZone {
    Circle {
        radius: Option<f64>,
    },
    Rect {
        width: f64,
        height: f64,
        offset_x: f64,
        offset_y: f64,
    },
    Custom(BoundaryFn),
}

impl Default for HitZone {
    fn default() -> Self {
        Self::Circle { radius: None }
    }
}

/// Serializable subset of [`HitZone`]. Custom boundaries can only be attached in code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HitZoneRecord {
    Rect {
        width: f64,
        height: f64,
        #[serde(default)]
        offset_x: f64,
        #[serde(default)]
        offset_y: f64,
    },
    Circle {
        radius: Option<f64>,
    },
}

impl From<HitZoneRecord> for HitZone {
    fn from(record: HitZoneRecord) -> Self {
        match record {
            HitZoneRecord::Rect {
                width,
                height,
                offset_x,
                offset_y,
            } => HitZone::Rect {
                width,
                height,
                offset_x,
                offset_y,
            },
            HitZoneRecord::Circle { radius } => HitZone::Circle { radius },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Marker {
    pub position: Position,
    pub kind: MarkerKind,
    /// Recomputed on every redraw. Not meaningful before the first pass.
    pub visible: bool,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub hidden: bool,
    pub owner: Option<Owner>,
    pub screen_anchor: Option<ScreenPoint>,
    pub hit_zone: HitZone,
    /// Set when the zone was supplied by the caller or the ingest record.
    /// Chunk and component zones are otherwise sized on every redraw.
    pub fixed_hit_zone: bool,
    /// Screen-space offset added to the projected anchor before the bounds cull.
    pub cull_margin: (f64, f64),
    pub tooltip: Option<String>,
    pub clipboard: Option<String>,
}

impl Marker {
    pub fn new(kind: MarkerKind, position: Position) -> Self {
        Self {
            position,
            kind,
            visible: false,
            min_zoom: None,
            max_zoom: None,
            hidden: false,
            owner: None,
            screen_anchor: None,
            hit_zone: HitZone::default(),
            fixed_hit_zone: false,
            cull_margin: (0.0, 0.0),
            tooltip: None,
            clipboard: None,
        }
    }

    pub fn entity(position: Position, state: EntityState) -> Self {
        Self::new(MarkerKind::Entity(state), position)
    }

    pub fn chunk(position: Position, info: ChunkInfo) -> Self {
        Self::new(MarkerKind::Chunk(info), position)
    }

    pub fn component(position: Position, info: ComponentInfo) -> Self {
        Self::new(MarkerKind::Component(info), position)
    }

    pub fn generic(position: Position) -> Self {
        Self::new(MarkerKind::Generic, position)
    }

    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_hit_zone(mut self, hit_zone: HitZone) -> Self {
        self.hit_zone = hit_zone;
        self.fixed_hit_zone = true;
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: Option<f64>, max_zoom: Option<f64>) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner
            .as_ref()
            .map(|owner| owner.user_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// Record form of a marker as it appears in an ingest file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub position: Position,
    #[serde(flatten)]
    pub kind: MarkerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_zone: Option<HitZoneRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cull_margin: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipboard: Option<String>,
}

impl From<MarkerRecord> for Marker {
    fn from(record: MarkerRecord) -> Self {
        let [cull_dx, cull_dy] = record.cull_margin.unwrap_or([0.0, 0.0]);
        Self {
            position: record.position,
            kind: record.kind,
            visible: false,
            min_zoom: record.min_zoom,
            max_zoom: record.max_zoom,
            hidden: record.hidden,
            owner: record.owner,
            screen_anchor: None,
            fixed_hit_zone: record.hit_zone.is_some(),
            hit_zone: record.hit_zone.map(HitZone::from).unwrap_or_default(),
            cull_margin: (cull_dx, cull_dy),
            tooltip: record.tooltip,
            clipboard: record.clipboard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_dominates_sleeping() {
        let state = EntityState {
            index: 1,
            frozen: true,
            sleeping: true,
        };
        assert_eq!(state.activity(), EntityActivity::Frozen);
        assert_eq!(EntityState::default().activity(), EntityActivity::Awake);
    }

    #[test]
    fn impact_level_saturates() {
        assert_eq!(ImpactLevel::new(12).get(), 7);
        assert_eq!(ImpactLevel::new(3).bit(), 0b1000);
    }

    #[test]
    fn record_defaults_to_circle_hit_zone() {
        let record: MarkerRecord =
            serde_json::from_str(r#"{"type":"chunk","position":{"x":1.0,"y":2.0}}"#).unwrap();
        let marker = Marker::from(record);
        assert!(matches!(marker.kind, MarkerKind::Chunk(_)));
        assert!(matches!(marker.hit_zone, HitZone::Circle { radius: None }));
        assert!(!marker.fixed_hit_zone);
        assert_eq!(marker.position.z, 0.0);
        assert!(!marker.visible);
    }

    #[test]
    fn record_with_entity_fields_and_rect_zone() {
        let json = r#"{
            "type": "entity",
            "index": 42,
            "sleeping": true,
            "position": {"x": 3.0, "y": 4.0, "z": 5.0},
            "owner": {"display_name": "Bob", "user_name": "bob", "user_id": "u-1"},
            "hit_zone": {"width": 10.0, "height": 6.0, "offset_x": 2.0}
        }"#;
        let marker = Marker::from(serde_json::from_str::<MarkerRecord>(json).unwrap());
        let MarkerKind::Entity(state) = marker.kind else {
            panic!("expected entity, got {:?}", marker.kind);
        };
        assert_eq!(state.index, 42);
        assert_eq!(state.activity(), EntityActivity::Asleep);
        assert_eq!(marker.owner_id(), Some("u-1"));
        assert!(marker.fixed_hit_zone);
        match marker.hit_zone {
            HitZone::Rect {
                width,
                height,
                offset_x,
                offset_y,
            } => {
                assert_eq!((width, height, offset_x, offset_y), (10.0, 6.0, 2.0, 0.0));
            }
            other => panic!("expected rect zone, got {other:?}"),
        }
    }

    #[test]
    fn unknown_type_becomes_generic() {
        let record: MarkerRecord =
            serde_json::from_str(r#"{"type":"beacon","position":{"x":0.0,"y":0.0}}"#).unwrap();
        assert_eq!(record.kind, MarkerKind::Generic);
    }

    #[test]
    fn boundary_fn_is_called_with_world_coordinates() {
        let zone = BoundaryFn::new(|x, y| x > 0.0 && y < 0.0);
        assert!(zone.contains(1.0, -1.0));
        assert!(!zone.contains(-1.0, -1.0));
    }
}
