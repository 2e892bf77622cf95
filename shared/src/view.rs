use crate::config::ZoomLimits;
use crate::extent::Extent;

/// Share of the viewport width where the data centre lands in landscape
/// layouts. Leaves room on the left for the settings overlay.
const LANDSCAPE_HORIZONTAL_BIAS: f64 = 0.6;
const CENTERED: f64 = 0.5;

/// Pan/zoom/skew transform between world coordinates and the canvas.
///
/// Three coordinate spaces are involved:
/// - world units (marker positions),
/// - client pixels (CSS pixels, what pointer events report; pan lives here),
/// - screen pixels (device pixels on the canvas backing store).
///
/// The pan Y component is stored negated, mirroring how the Y axis is flipped.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub pan_x: f64,
    pub pan_y: f64,
    pub scale: f64,
    pub pixel_ratio: f64,
    pub skew_x: f64,
    pub skew_y: f64,
    pub dirty: bool,
    mirror_sum: f64,
    viewport_width: f64,
    viewport_height: f64,
    limits: ZoomLimits,
}

impl Default for View {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            scale: 1.0,
            pixel_ratio: 1.0,
            skew_x: 0.0,
            skew_y: 0.0,
            dirty: false,
            mirror_sum: 0.0,
            viewport_width: 0.0,
            viewport_height: 0.0,
            limits: ZoomLimits::default(),
        }
    }
}

impl View {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Frame the whole extent inside the viewport with `padding` world units
    /// of margin on every side.
    pub fn initialize(&mut self, extent: &Extent, viewport_width: f64, viewport_height: f64, padding: f64) {
        self.viewport_width = viewport_width.max(0.0);
        self.viewport_height = viewport_height.max(0.0);
        self.mirror_sum = extent.min_y + extent.max_y;

        let fit_x = fit_scale(self.viewport_width, extent.width() + padding * 2.0);
        let fit_y = fit_scale(self.viewport_height, extent.height() + padding * 2.0);
        let fitted = match (fit_x, fit_y) {
            (Some(a), Some(b)) => a.min(b),
            (Some(s), None) | (None, Some(s)) => s,
            (None, None) => 1.0,
        };
        self.scale = fitted.clamp(self.limits.min, self.limits.max);

        let landscape = self.viewport_width > self.viewport_height;
        let horizontal = if landscape {
            LANDSCAPE_HORIZONTAL_BIAS
        } else {
            CENTERED
        };
        let (center_x, center_y) = extent.center();
        self.pan_x = self.viewport_width * horizontal - center_x * self.scale;
        // The mirrored centre is the centre itself, so only the sign convention matters here.
        self.pan_y = center_y * self.scale - self.viewport_height * CENTERED;

        self.skew_x = 0.0;
        self.skew_y = 0.0;
        self.dirty = false;

        tracing::debug!(
            scale = self.scale,
            pan_x = self.pan_x,
            pan_y = self.pan_y,
            landscape,
            "view framed"
        );
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    pub fn viewport_size(&self) -> (f64, f64) {
        (self.viewport_width, self.viewport_height)
    }

    /// Canvas backing-store size in device pixels.
    pub fn canvas_size(&self) -> (f64, f64) {
        (
            self.viewport_width * self.pixel_ratio,
            self.viewport_height * self.pixel_ratio,
        )
    }

    /// Resize without reframing. The next tick repaints.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_width = width.max(0.0);
        self.viewport_height = height.max(0.0);
        self.dirty = true;
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        if pixel_ratio != self.pixel_ratio {
            self.pixel_ratio = pixel_ratio;
            self.dirty = true;
        }
    }

    pub fn set_skew(&mut self, skew_x: f64, skew_y: f64) {
        self.skew_x = skew_x;
        self.skew_y = skew_y;
        self.dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn world_to_screen_x(&self, x: f64, z: f64) -> f64 {
        let r = self.pixel_ratio;
        x * self.scale * r + self.pan_x * r + z * self.skew_x * r * self.scale
    }

    pub fn world_to_screen_y(&self, y: f64, z: f64) -> f64 {
        let r = self.pixel_ratio;
        (self.mirror_sum - y) * self.scale * r - self.pan_y * r + z * self.skew_y * r * self.scale
    }

    pub fn world_to_screen(&self, x: f64, y: f64, z: f64) -> (f64, f64) {
        (self.world_to_screen_x(x, z), self.world_to_screen_y(y, z))
    }

    /// Inverse of [`Self::world_to_screen_x`] on the `z = 0` plane. Skew is not
    /// applied: a point at altitude maps back to where its shadow would be.
    pub fn screen_to_world_x(&self, sx: f64) -> f64 {
        (sx / self.pixel_ratio - self.pan_x) / self.scale
    }

    pub fn screen_to_world_y(&self, sy: f64) -> f64 {
        self.mirror_sum - (sy / self.pixel_ratio + self.pan_y) / self.scale
    }

    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        (self.screen_to_world_x(sx), self.screen_to_world_y(sy))
    }

    /// Pointer coordinates (CSS pixels) to world coordinates.
    pub fn client_to_world(&self, cx: f64, cy: f64) -> (f64, f64) {
        self.screen_to_world(cx * self.pixel_ratio, cy * self.pixel_ratio)
    }

    /// Zoom by `factor` keeping the world point under `(client_x, client_y)`
    /// fixed. Returns `false` and leaves the view untouched (but clean) when the
    /// resulting scale would leave the zoom limits.
    pub fn zoom_at_point(&mut self, client_x: f64, client_y: f64, factor: f64) -> bool {
        let next = self.scale * factor;
        if !factor.is_finite() || factor <= 0.0 || !self.limits.contains(next) {
            tracing::trace!(scale = self.scale, factor, "zoom rejected");
            self.dirty = false;
            return false;
        }
        self.pan_x = client_x - factor * (client_x - self.pan_x);
        self.pan_y = -client_y - factor * (-client_y - self.pan_y);
        self.scale = next;
        self.dirty = true;
        true
    }

    /// Pan by a client-space delta. Screen Y points down, pan Y is stored negated.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y -= dy;
        self.dirty = true;
    }

    /// Zoom read-out: effective device pixels per world unit.
    pub fn zoom_display(&self) -> f64 {
        self.scale * self.pixel_ratio
    }

    /// Source units covered by one device pixel, for the zoom read-out.
    pub fn units_per_pixel(&self, coord_scale: f64) -> f64 {
        1.0 / (self.scale * self.pixel_ratio * coord_scale / 1000.0)
    }
}

fn fit_scale(viewport: f64, span: f64) -> Option<f64> {
    let scale = viewport / span;
    (scale.is_finite() && scale > 0.0).then_some(scale)
}
