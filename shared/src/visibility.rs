use crate::config::MapConfig;
use crate::layers::LayerFlags;
use crate::marker::{HitZone, Marker, MarkerKind, ScreenPoint};
use crate::owner_filter::OwnerFilter;
use crate::stats::OwnerStats;
use crate::store::MarkerStore;
use crate::view::View;

/// Side products of one visibility pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Visible markers, not counting chunk squares.
    pub markers_visible: usize,
    pub chunks_visible: usize,
    pub owners: OwnerStats,
}

impl FrameStats {
    pub fn total_visible(&self) -> usize {
        self.markers_visible + self.chunks_visible
    }
}

/// Everything a pass needs besides the markers themselves.
#[derive(Debug, Clone, Copy)]
pub struct CullContext<'a> {
    pub view: &'a View,
    pub layers: &'a LayerFlags,
    pub filter: &'a OwnerFilter,
    pub config: &'a MapConfig,
}

impl CullContext<'_> {
    /// Category, zoom and owner gates. Cheap checks first.
    fn passes_gates(&self, marker: &Marker) -> bool {
        let scale = self.view.scale;
        if marker.hidden {
            return false;
        }
        if marker.min_zoom.is_some_and(|min| scale < min) {
            return false;
        }
        if marker.max_zoom.is_some_and(|max| scale > max) {
            return false;
        }
        if !self.layers.allows(&marker.kind) {
            return false;
        }
        self.filter.matches(marker.owner.as_ref())
    }

    fn on_canvas(&self, anchor: ScreenPoint, cull_margin: (f64, f64)) -> bool {
        let (canvas_w, canvas_h) = self.view.canvas_size();
        let margin = self.config.cull_margin;
        let x = anchor.x + cull_margin.0;
        let y = anchor.y + cull_margin.1;
        x >= -margin && x <= canvas_w + margin && y >= -margin && y <= canvas_h + margin
    }

    /// Per-frame hit zone sizing for markers whose footprint scales with zoom.
    fn finalize_hit_zone(&self, marker: &mut Marker) {
        if marker.fixed_hit_zone || matches!(marker.hit_zone, HitZone::Custom(_)) {
            return;
        }
        let scale = self.view.scale;
        match marker.kind {
            MarkerKind::Chunk(_) => {
                // Chunk squares are drawn from their anchor corner, so the
                // zone is displaced by half a square towards the bottom right.
                let size = self.config.chunk_world_size * scale;
                marker.hit_zone = HitZone::Rect {
                    width: size,
                    height: size,
                    offset_x: size * 0.5,
                    offset_y: -size * 0.5,
                };
            }
            MarkerKind::Component(_) => {
                let size = (self.config.component_world_size * scale).max(self.config.component_min_px);
                marker.hit_zone = HitZone::Rect {
                    width: size,
                    height: size,
                    offset_x: 0.0,
                    offset_y: 0.0,
                };
            }
            MarkerKind::Entity(_) | MarkerKind::Generic => {}
        }
    }
}

/// Decide which markers are drawn and hit-testable this frame, caching each
/// survivor's projected anchor. Runs over the whole store in paint order.
pub fn refresh_visibility(store: &mut MarkerStore, cx: CullContext<'_>) -> FrameStats {
    let mut stats = FrameStats::default();

    for marker in store.iter_mut() {
        marker.visible = false;
        marker.screen_anchor = None;

        if !cx.passes_gates(marker) {
            continue;
        }

        let p = marker.position;
        let (sx, sy) = cx.view.world_to_screen(p.x, p.y, p.z);
        let anchor = ScreenPoint { x: sx, y: sy };
        marker.screen_anchor = Some(anchor);

        if !cx.on_canvas(anchor, marker.cull_margin) {
            continue;
        }

        cx.finalize_hit_zone(marker);
        marker.visible = true;

        if matches!(marker.kind, MarkerKind::Chunk(_)) {
            stats.chunks_visible += 1;
        } else {
            stats.markers_visible += 1;
        }
        if let Some(owner) = marker.owner.as_ref().filter(|o| !o.user_id.is_empty()) {
            stats.owners.add_user(owner);
            stats.owners.add_count(&owner.user_id, 1);
        }
    }

    stats
}
