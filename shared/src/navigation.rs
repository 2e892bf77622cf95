use crate::config::MapConfig;
use crate::view::View;

const PRIMARY_BUTTON: i16 = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Panning,
    Pinching { start_distance: f64, start_scale: f64 },
    /// More than two pointers went down. Ignored until every pointer lifts.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomButton {
    In,
    Out,
}

/// Pointer/touch/wheel gesture tracker that turns raw input into view pans
/// and anchored zooms. Coordinates are client (CSS) pixels.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    /// Active pointers by id, in the order they went down.
    pointers: Vec<(i32, (f64, f64))>,
    state: GestureState,
    navigating: bool,
    scroll_zoom_factor: f64,
    button_zoom_factor: f64,
}

impl PointerTracker {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            pointers: Vec::new(),
            state: GestureState::Idle,
            navigating: false,
            scroll_zoom_factor: config.scroll_zoom_factor,
            button_zoom_factor: config.button_zoom_factor,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_dragging(&self) -> bool {
        !self.pointers.is_empty()
    }

    /// Whether a pan or zoom happened since the last call. Clears the flag.
    pub fn take_navigating(&mut self) -> bool {
        std::mem::take(&mut self.navigating)
    }

    pub fn pointer_down(&mut self, id: i32, x: f64, y: f64, button: i16, view: &View) {
        if button != PRIMARY_BUTTON {
            return;
        }
        if self.state == GestureState::Cancelled && self.pointers.is_empty() {
            self.state = GestureState::Idle;
        }
        match self.pointers.iter_mut().find(|(pid, _)| *pid == id) {
            Some((_, pos)) => *pos = (x, y),
            None => self.pointers.push((id, (x, y))),
        }
        if self.state == GestureState::Cancelled {
            return;
        }
        self.state = match self.pointers.len() {
            1 => GestureState::Panning,
            2 => GestureState::Pinching {
                start_distance: self.pinch_distance(),
                start_scale: view.scale,
            },
            _ => GestureState::Cancelled,
        };
    }

    /// Feed a pointer move. Returns `true` when the view was changed.
    pub fn pointer_move(&mut self, id: i32, x: f64, y: f64, view: &mut View) -> bool {
        let Some(slot) = self.pointers.iter().position(|(pid, _)| *pid == id) else {
            // Move from a pointer we never saw go down: drop everything.
            self.pointers.clear();
            if self.state != GestureState::Cancelled {
                self.state = GestureState::Idle;
            }
            return false;
        };

        let (last_x, last_y) = self.pointers[slot].1;
        self.pointers[slot].1 = (x, y);

        let changed = match self.state {
            GestureState::Panning => {
                self.navigating = true;
                view.pan(x - last_x, y - last_y);
                true
            }
            GestureState::Pinching {
                start_distance,
                start_scale,
            } => {
                // A rejected zoom still counts as navigating.
                self.navigating = true;
                let distance = self.pinch_distance();
                if start_distance <= 0.0 || view.scale <= 0.0 {
                    false
                } else {
                    let (cx, cy) = self.centroid();
                    let factor = start_scale * distance / start_distance / view.scale;
                    view.zoom_at_point(cx, cy, factor)
                }
            }
            GestureState::Cancelled => {
                self.pointers.clear();
                view.mark_dirty();
                return false;
            }
            GestureState::Idle => false,
        };
        changed
    }

    pub fn pointer_up(&mut self, id: i32) {
        let before = self.pointers.len();
        self.pointers.retain(|(pid, _)| *pid != id);
        if self.pointers.len() == before {
            return;
        }
        self.state = match (self.state, self.pointers.len()) {
            (GestureState::Cancelled, 0) => GestureState::Idle,
            (GestureState::Cancelled, _) => GestureState::Cancelled,
            (_, 0) => GestureState::Idle,
            (_, 1) => GestureState::Panning,
            (state, _) => state,
        };
    }

    /// Wheel zoom anchored at the cursor. Positive delta zooms out.
    pub fn wheel(&mut self, delta_y: f64, x: f64, y: f64, view: &mut View) -> bool {
        if delta_y == 0.0 {
            return false;
        }
        let factor = if delta_y > 0.0 {
            1.0 / self.scroll_zoom_factor
        } else {
            self.scroll_zoom_factor
        };
        view.zoom_at_point(x, y, factor)
    }

    /// On-screen zoom buttons zoom about the viewport centre.
    pub fn zoom_button(&mut self, button: ZoomButton, view: &mut View) -> bool {
        let (width, height) = view.viewport_size();
        let factor = match button {
            ZoomButton::In => self.button_zoom_factor,
            ZoomButton::Out => 1.0 / self.button_zoom_factor,
        };
        view.zoom_at_point(width * 0.5, height * 0.5, factor)
    }

    /// Distance between the first two pointers.
    fn pinch_distance(&self) -> f64 {
        match self.pointers.as_slice() {
            [(_, (ax, ay)), (_, (bx, by)), ..] => (ax - bx).hypot(ay - by),
            _ => 0.0,
        }
    }

    fn centroid(&self) -> (f64, f64) {
        let n = self.pointers.len().max(1) as f64;
        let (sx, sy) = self
            .pointers
            .iter()
            .fold((0.0, 0.0), |(sx, sy), (_, (x, y))| (sx + x, sy + y));
        (sx / n, sy / n)
    }
}
