use crate::marker::Marker;

/// Synthetic half-size used when there is nothing to bound.
const EMPTY_EXTENT: f64 = 100.0;

/// Axis-aligned bounds of every marker position, including altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub min_alt: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_alt: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            min_x: -EMPTY_EXTENT,
            min_y: -EMPTY_EXTENT,
            min_alt: -EMPTY_EXTENT,
            max_x: EMPTY_EXTENT,
            max_y: EMPTY_EXTENT,
            max_alt: EMPTY_EXTENT,
        }
    }
}

impl Extent {
    /// Full recompute over the markers. Axes with no finite sample fall back to
    /// the synthetic box so scale computation never sees an inverted range.
    pub fn from_markers<'a>(markers: impl IntoIterator<Item = &'a Marker>) -> Self {
        let (mut min_x, mut min_y, mut min_alt) = (f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y, mut max_alt) =
            (f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);

        for marker in markers {
            let p = marker.position;
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            min_alt = min_alt.min(p.z);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
            max_alt = max_alt.max(p.z);
        }

        let fallback = Self::default();
        let extent = Self {
            min_x: finite_or(min_x, fallback.min_x),
            min_y: finite_or(min_y, fallback.min_y),
            min_alt: finite_or(min_alt, fallback.min_alt),
            max_x: finite_or(max_x, fallback.max_x),
            max_y: finite_or(max_y, fallback.max_y),
            max_alt: finite_or(max_alt, fallback.max_alt),
        };

        tracing::debug!(
            min_x = extent.min_x,
            min_y = extent.min_y,
            max_x = extent.max_x,
            max_y = extent.max_y,
            min_alt = extent.min_alt,
            max_alt = extent.max_alt,
            "recomputed marker extent"
        );
        extent
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// World Y grows opposite to screen Y; mirror across the extent's midline.
    pub fn mirror_y(&self, y: f64) -> f64 {
        self.min_y + self.max_y - y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
