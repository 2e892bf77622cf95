use serde::{Deserialize, Serialize};

pub const MIN_ZOOM_LEVEL: f64 = 0.01;
pub const MAX_ZOOM_LEVEL: f64 = 180.0;
pub const DEFAULT_MAP_PADDING: f64 = 500.0;
/// How many pixels around the view still count as visible. Beyond this, markers are culled.
pub const VIEW_CULL_MARGIN: f64 = 90.0;
pub const DEFAULT_HIT_RADIUS: f64 = 12.0;
pub const SCROLL_ZOOM_FACTOR: f64 = 1.25;
pub const BUTTON_ZOOM_FACTOR: f64 = 1.5;
/// Source units per world unit. Only used for the coordinate read-outs.
pub const COORD_SCALE: f64 = 100.0;
pub const CHUNK_WORLD_SIZE: f64 = 20.48;
pub const COMPONENT_WORLD_SIZE: f64 = 0.8;
pub const COMPONENT_MIN_PX: f64 = 4.0;

/// Tunables for a map session. Every field falls back to the constants above,
/// so hosts can deserialize a partial override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub padding: f64,
    pub cull_margin: f64,
    pub default_hit_radius: f64,
    pub scroll_zoom_factor: f64,
    pub button_zoom_factor: f64,
    pub coord_scale: f64,
    pub chunk_world_size: f64,
    pub component_world_size: f64,
    pub component_min_px: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM_LEVEL,
            max_zoom: MAX_ZOOM_LEVEL,
            padding: DEFAULT_MAP_PADDING,
            cull_margin: VIEW_CULL_MARGIN,
            default_hit_radius: DEFAULT_HIT_RADIUS,
            scroll_zoom_factor: SCROLL_ZOOM_FACTOR,
            button_zoom_factor: BUTTON_ZOOM_FACTOR,
            coord_scale: COORD_SCALE,
            chunk_world_size: CHUNK_WORLD_SIZE,
            component_world_size: COMPONENT_WORLD_SIZE,
            component_min_px: COMPONENT_MIN_PX,
        }
    }
}

impl MapConfig {
    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min: self.min_zoom,
            max: self.max_zoom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl ZoomLimits {
    pub fn contains(&self, scale: f64) -> bool {
        scale >= self.min && scale <= self.max
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: MIN_ZOOM_LEVEL,
            max: MAX_ZOOM_LEVEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let cfg: MapConfig = serde_json::from_str(r#"{"max_zoom": 40.0}"#).unwrap();
        assert_eq!(cfg.max_zoom, 40.0);
        assert_eq!(cfg.min_zoom, MIN_ZOOM_LEVEL);
        assert_eq!(cfg.cull_margin, VIEW_CULL_MARGIN);
    }

    #[test]
    fn zoom_limits_are_inclusive() {
        let limits = MapConfig::default().zoom_limits();
        assert!(limits.contains(MIN_ZOOM_LEVEL));
        assert!(limits.contains(MAX_ZOOM_LEVEL));
        assert!(!limits.contains(MAX_ZOOM_LEVEL * 1.01));
        assert!(!limits.contains(0.0));
    }
}
