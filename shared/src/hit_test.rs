use crate::marker::{HitZone, Marker};
use crate::store::MarkerStore;
use crate::view::View;

/// Tooltip payload for the marker under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipHit {
    pub index: usize,
    pub tooltip: Option<String>,
    pub clipboard: Option<String>,
}

impl TooltipHit {
    fn from_marker(index: usize, marker: &Marker) -> Self {
        Self {
            index,
            tooltip: marker.tooltip.clone(),
            clipboard: marker.clipboard.clone(),
        }
    }
}

/// Index of the topmost visible marker whose hit zone contains the cursor
/// (client pixels). Scans in paint order and keeps the last match, so the
/// marker drawn on top wins.
///
/// Each marker is tested around its cached screen anchor unprojected onto the
/// ground plane, which keeps skewed (raised) markers hittable where they are
/// drawn. Markers without a cached anchor fall back to their raw position.
pub fn query(store: &MarkerStore, view: &View, default_radius: f64, client_x: f64, client_y: f64) -> Option<usize> {
    let (cursor_x, cursor_y) = view.client_to_world(client_x, client_y);
    let scale = view.scale;

    let mut hit = None;
    for (index, marker) in store.visible() {
        let (anchor_x, anchor_y) = match marker.screen_anchor {
            Some(anchor) => view.screen_to_world(anchor.x, anchor.y),
            None => (marker.position.x, marker.position.y),
        };
        let contains = match &marker.hit_zone {
            HitZone::Custom(boundary) => boundary.contains(cursor_x, cursor_y),
            HitZone::Rect {
                width,
                height,
                offset_x,
                offset_y,
            } => {
                let half_w = width * 0.5 / scale;
                let half_h = height * 0.5 / scale;
                let dx = anchor_x - cursor_x + offset_x / scale;
                let dy = anchor_y - cursor_y + offset_y / scale;
                dx.abs() <= half_w && dy.abs() <= half_h
            }
            HitZone::Circle { radius } => {
                let r = radius.unwrap_or(default_radius) / scale;
                let dx = anchor_x - cursor_x;
                let dy = anchor_y - cursor_y;
                dx * dx + dy * dy <= r * r
            }
        };
        if contains {
            hit = Some(index);
        }
    }
    hit
}

pub fn tooltip_at(store: &MarkerStore, view: &View, default_radius: f64, client_x: f64, client_y: f64) -> Option<TooltipHit> {
    let index = query(store, view, default_radius, client_x, client_y)?;
    store.get(index).map(|marker| TooltipHit::from_marker(index, marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_HIT_RADIUS, MapConfig};
    use crate::extent::Extent;
    use crate::layers::LayerFlags;
    use crate::marker::{BoundaryFn, ChunkInfo, EntityState, Position};
    use crate::owner_filter::OwnerFilter;
    use crate::visibility::{CullContext, refresh_visibility};

    fn framed_view() -> View {
        let extent = Extent {
            min_x: -100.0,
            max_x: 100.0,
            min_y: -100.0,
            max_y: 100.0,
            ..Extent::default()
        };
        let mut view = View::default();
        view.initialize(&extent, 400.0, 400.0, 0.0);
        view
    }

    fn refresh(store: &mut MarkerStore, view: &View) {
        refresh_visibility(
            store,
            CullContext {
                view,
                layers: &LayerFlags::default(),
                filter: &OwnerFilter::Inert,
                config: &MapConfig::default(),
            },
        );
    }

    fn client_of(view: &View, x: f64, y: f64) -> (f64, f64) {
        let (sx, sy) = view.world_to_screen(x, y, 0.0);
        (sx / view.pixel_ratio, sy / view.pixel_ratio)
    }

    #[test]
    fn later_marker_wins_on_overlap() {
        let view = framed_view();
        let mut store = MarkerStore::new();
        store.add(Marker::generic(Position::default()).with_tooltip("A"));
        store.add(Marker::generic(Position::default()).with_tooltip("B"));
        refresh(&mut store, &view);

        let (cx, cy) = client_of(&view, 0.0, 0.0);
        let hit = tooltip_at(&store, &view, DEFAULT_HIT_RADIUS, cx, cy).unwrap();
        assert_eq!(hit.index, 1);
        assert_eq!(hit.tooltip.as_deref(), Some("B"));
    }

    #[test]
    fn circle_radius_is_screen_space() {
        let view = framed_view();
        assert_eq!(view.scale, 2.0);
        let mut store = MarkerStore::new();
        store.add(Marker::generic(Position::default()));
        refresh(&mut store, &view);

        let (cx, cy) = client_of(&view, 0.0, 0.0);
        // 12 px radius at scale 2 covers 6 world units.
        assert_eq!(query(&store, &view, DEFAULT_HIT_RADIUS, cx + 11.0, cy), Some(0));
        assert_eq!(query(&store, &view, DEFAULT_HIT_RADIUS, cx + 13.0, cy), None);
    }

    #[test]
    fn explicit_radius_overrides_default() {
        let view = framed_view();
        let mut store = MarkerStore::new();
        store.add(Marker::generic(Position::default()).with_hit_zone(HitZone::Circle { radius: Some(30.0) }));
        refresh(&mut store, &view);
        let (cx, cy) = client_of(&view, 0.0, 0.0);
        assert_eq!(query(&store, &view, DEFAULT_HIT_RADIUS, cx + 25.0, cy), Some(0));
    }

    #[test]
    fn invisible_markers_are_skipped() {
        let view = framed_view();
        let mut store = MarkerStore::new();
        let mut hidden = Marker::generic(Position::default());
        hidden.hidden = true;
        store.add(hidden);
        refresh(&mut store, &view);
        let (cx, cy) = client_of(&view, 0.0, 0.0);
        assert_eq!(query(&store, &view, DEFAULT_HIT_RADIUS, cx, cy), None);
    }

    #[test]
    fn chunk_zone_extends_from_its_corner() {
        let view = framed_view();
        let mut store = MarkerStore::new();
        store.add(Marker::chunk(Position::new(0.0, 0.0, 0.0), ChunkInfo::default()));
        refresh(&mut store, &view);

        // Chunk squares cover [x, x + size] and [y - size, y] in world units.
        let inside = client_of(&view, 10.0, -10.0);
        let left = client_of(&view, -1.0, -10.0);
        let above = client_of(&view, 10.0, 1.0);
        assert_eq!(query(&store, &view, DEFAULT_HIT_RADIUS, inside.0, inside.1), Some(0));
        assert_eq!(query(&store, &view, DEFAULT_HIT_RADIUS, left.0, left.1), None);
        assert_eq!(query(&store, &view, DEFAULT_HIT_RADIUS, above.0, above.1), None);
    }

    #[test]
    fn custom_boundary_uses_world_coordinates() {
        let view = framed_view();
        let mut store = MarkerStore::new();
        store.add(
            Marker::generic(Position::default())
                .with_hit_zone(HitZone::Custom(BoundaryFn::new(|x, _| (40.0..=60.0).contains(&x)))),
        );
        refresh(&mut store, &view);
        let inside = client_of(&view, 50.0, 80.0);
        let outside = client_of(&view, 0.0, 0.0);
        assert_eq!(query(&store, &view, DEFAULT_HIT_RADIUS, inside.0, inside.1), Some(0));
        assert_eq!(query(&store, &view, DEFAULT_HIT_RADIUS, outside.0, outside.1), None);
    }

    #[test]
    fn skewed_marker_is_hit_where_drawn() {
        let mut view = framed_view();
        view.set_skew(0.5, 0.0);
        let mut store = MarkerStore::new();
        store.add(Marker::entity(Position::new(0.0, 0.0, 20.0), EntityState::default()));
        refresh(&mut store, &view);

        // Drawn 10 world units to the right of its ground position.
        let drawn = client_of(&view, 10.0, 0.0);
        let ground = client_of(&view, 0.0, 0.0);
        assert_eq!(query(&store, &view, DEFAULT_HIT_RADIUS, drawn.0, drawn.1), Some(0));
        assert_eq!(query(&store, &view, DEFAULT_HIT_RADIUS, ground.0, ground.1), None);
    }

    #[test]
    fn empty_store_returns_none() {
        let view = framed_view();
        let store = MarkerStore::new();
        assert!(tooltip_at(&store, &view, DEFAULT_HIT_RADIUS, 0.0, 0.0).is_none());
    }
}
