use crate::config::MapConfig;
use crate::extent::Extent;
use crate::hit_test::{self, TooltipHit};
use crate::ingest::{IngestError, MarkerFile, parse_marker_file};
use crate::layers::LayerFlags;
use crate::marker::{ImpactLevel, Marker, MarkerRecord};
use crate::navigation::PointerTracker;
use crate::owner_filter::{FilterError, OwnerFilter};
use crate::stats::OwnerStats;
use crate::store::MarkerStore;
use crate::view::View;
use crate::visibility::{CullContext, FrameStats, refresh_visibility};

/// Summary of a completed load, for status read-outs.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub markers: usize,
    pub extent: Extent,
    pub generated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One independent map instance: markers, view, layer toggles and filter.
///
/// Loading follows reset, repopulate, sort, reframe. Nothing here is
/// shared between sessions.
#[derive(Debug, Clone)]
pub struct MapSession {
    pub store: MarkerStore,
    pub extent: Extent,
    pub view: View,
    pub layers: LayerFlags,
    pub navigation: PointerTracker,
    filter: OwnerFilter,
    filter_text: String,
    config: MapConfig,
    last_frame: FrameStats,
    has_drawn: bool,
}

impl Default for MapSession {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}

impl MapSession {
    pub fn new(config: MapConfig) -> Self {
        Self {
            store: MarkerStore::new(),
            extent: Extent::default(),
            view: View::new(config.zoom_limits()),
            layers: LayerFlags::default(),
            navigation: PointerTracker::new(&config),
            filter: OwnerFilter::Inert,
            filter_text: String::new(),
            config,
            last_frame: FrameStats::default(),
            has_drawn: false,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.store.reset();
        self.last_frame = FrameStats::default();
        self.has_drawn = false;
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.store.add(marker);
    }

    pub fn sort_markers(&mut self) {
        self.store.sort();
    }

    /// Recompute the extent and frame it into the given viewport.
    pub fn reframe(&mut self, viewport_width: f64, viewport_height: f64) {
        self.extent = Extent::from_markers(&self.store);
        self.view
            .initialize(&self.extent, viewport_width, viewport_height, self.config.padding);
        // Initialisation leaves the view clean; the new framing still needs a paint.
        self.view.mark_dirty();
    }

    /// Replace the store with `records`, then sort and reframe using the
    /// current viewport size.
    pub fn load_records(&mut self, records: impl IntoIterator<Item = MarkerRecord>) -> usize {
        self.reset();
        self.store.extend(records.into_iter().map(Marker::from));
        self.sort_markers();
        let (width, height) = self.view.viewport_size();
        self.reframe(width, height);
        tracing::info!(markers = self.store.len(), "loaded markers");
        self.store.len()
    }

    /// Parse and load a marker file. On error the previous markers stay in place.
    pub fn load_json(&mut self, bytes: &[u8]) -> Result<LoadSummary, IngestError> {
        let MarkerFile {
            generated_at,
            markers,
        } = parse_marker_file(bytes)?;
        let count = self.load_records(markers);
        Ok(LoadSummary {
            markers: count,
            extent: self.extent,
            generated_at,
        })
    }

    pub fn resize(&mut self, viewport_width: f64, viewport_height: f64) {
        self.view.set_viewport_size(viewport_width, viewport_height);
    }

    /// Run the visibility pass and clear the dirty flag.
    pub fn redraw(&mut self) -> &FrameStats {
        let stats = refresh_visibility(
            &mut self.store,
            CullContext {
                view: &self.view,
                layers: &self.layers,
                filter: &self.filter,
                config: &self.config,
            },
        );
        self.last_frame = stats;
        self.has_drawn = true;
        self.view.dirty = false;
        &self.last_frame
    }

    pub fn has_drawn(&self) -> bool {
        self.has_drawn
    }

    pub fn last_frame(&self) -> &FrameStats {
        &self.last_frame
    }

    pub fn owner_stats(&self) -> &OwnerStats {
        &self.last_frame.owners
    }

    /// Topmost visible marker under the cursor (client pixels).
    pub fn query(&self, client_x: f64, client_y: f64) -> Option<&Marker> {
        let index = hit_test::query(
            &self.store,
            &self.view,
            self.config.default_hit_radius,
            client_x,
            client_y,
        )?;
        self.store.get(index)
    }

    pub fn tooltip_at(&self, client_x: f64, client_y: f64) -> Option<TooltipHit> {
        hit_test::tooltip_at(
            &self.store,
            &self.view,
            self.config.default_hit_radius,
            client_x,
            client_y,
        )
    }

    /// Cursor position in source units, for the coordinate read-out.
    pub fn cursor_source_coords(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        let (wx, wy) = self.view.client_to_world(client_x, client_y);
        (wx * self.config.coord_scale, wy * self.config.coord_scale)
    }

    pub fn owner_filter_text(&self) -> &str {
        &self.filter_text
    }

    /// Replace the owner filter. An invalid pattern keeps the previous filter.
    pub fn set_owner_filter(&mut self, text: &str) -> Result<(), FilterError> {
        let filter = OwnerFilter::parse(text)?;
        self.filter = filter;
        self.filter_text = text.to_string();
        self.view.mark_dirty();
        Ok(())
    }

    pub fn set_layer(&mut self, name: &str, on: bool) {
        if self.layers.set(name, on) {
            self.view.mark_dirty();
        }
    }

    pub fn set_impact(&mut self, level: ImpactLevel, on: bool) {
        if self.layers.set_impact(level, on) {
            self.view.mark_dirty();
        }
    }
}
