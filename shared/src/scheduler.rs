use crate::hit_test::TooltipHit;
use crate::session::MapSession;
use crate::visibility::FrameStats;

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipUpdate {
    Unchanged,
    Hide,
    Show(TooltipHit),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    /// Stats of the visibility pass, when this tick repainted.
    pub redrawn: Option<FrameStats>,
    pub tooltip: TooltipUpdate,
}

/// Per-frame driver: repaint when the view is dirty, re-query the tooltip
/// when the cursor moved. Tooltips stay hidden while the user navigates.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    cursor: Option<(f64, f64)>,
    tooltip_dirty: bool,
    frames: u64,
    redraws: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor_moved(&mut self, client_x: f64, client_y: f64) {
        self.cursor = Some((client_x, client_y));
        self.tooltip_dirty = true;
    }

    pub fn cursor_left(&mut self) {
        self.cursor = None;
        self.tooltip_dirty = true;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    pub fn tick(&mut self, session: &mut MapSession) -> FrameOutcome {
        self.frames += 1;

        let redrawn = if session.view.dirty {
            self.redraws += 1;
            // Markers moved on screen, so whatever is under the cursor may have changed.
            self.tooltip_dirty = true;
            Some(session.redraw().clone())
        } else {
            None
        };

        let navigating = session.navigation.take_navigating() || session.navigation.is_dragging();
        let tooltip = if navigating {
            self.tooltip_dirty = true;
            TooltipUpdate::Hide
        } else if std::mem::take(&mut self.tooltip_dirty) {
            match self.cursor.and_then(|(x, y)| session.tooltip_at(x, y)) {
                Some(hit) if hit.tooltip.is_some() => TooltipUpdate::Show(hit),
                _ => TooltipUpdate::Hide,
            }
        } else {
            TooltipUpdate::Unchanged
        };

        FrameOutcome { redrawn, tooltip }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::{Marker, Position};

    fn loaded_session() -> MapSession {
        let mut session = MapSession::default();
        session.resize(800.0, 600.0);
        session.add_marker(Marker::generic(Position::default()).with_tooltip("origin"));
        session.reframe(800.0, 600.0);
        session
    }

    #[test]
    fn redraws_only_when_dirty() {
        let mut session = loaded_session();
        let mut scheduler = FrameScheduler::new();

        let first = scheduler.tick(&mut session);
        assert!(first.redrawn.is_some());
        assert!(!session.view.dirty);

        let second = scheduler.tick(&mut session);
        assert!(second.redrawn.is_none());
        assert_eq!(scheduler.frames(), 2);
        assert_eq!(scheduler.redraws(), 1);
    }

    #[test]
    fn shows_tooltip_under_cursor_once() {
        let mut session = loaded_session();
        let mut scheduler = FrameScheduler::new();
        scheduler.tick(&mut session);

        let (x, y) = session.view.world_to_screen(0.0, 0.0, 0.0);
        scheduler.cursor_moved(x, y);
        match scheduler.tick(&mut session).tooltip {
            TooltipUpdate::Show(hit) => assert_eq!(hit.tooltip.as_deref(), Some("origin")),
            other => panic!("expected tooltip, got {other:?}"),
        }
        assert_eq!(scheduler.tick(&mut session).tooltip, TooltipUpdate::Unchanged);

        scheduler.cursor_left();
        assert_eq!(scheduler.tick(&mut session).tooltip, TooltipUpdate::Hide);
    }

    #[test]
    fn navigation_hides_tooltip() {
        let mut session = loaded_session();
        let mut scheduler = FrameScheduler::new();
        scheduler.tick(&mut session);

        let (x, y) = session.view.world_to_screen(0.0, 0.0, 0.0);
        scheduler.cursor_moved(x, y);
        let view = session.view.clone();
        session.navigation.pointer_down(1, 10.0, 10.0, 0, &view);
        session.navigation.pointer_move(1, 20.0, 10.0, &mut session.view);

        let outcome = scheduler.tick(&mut session);
        assert!(outcome.redrawn.is_some());
        assert_eq!(outcome.tooltip, TooltipUpdate::Hide);

        session.navigation.pointer_up(1);
        // Panned 10 px right, so the marker now sits 10 px right of the cursor.
        assert!(matches!(scheduler.tick(&mut session).tooltip, TooltipUpdate::Show(_)));
    }

    #[test]
    fn marker_without_tooltip_text_hides() {
        let mut session = MapSession::default();
        session.resize(400.0, 400.0);
        session.add_marker(Marker::generic(Position::default()));
        session.reframe(400.0, 400.0);
        let mut scheduler = FrameScheduler::new();
        scheduler.tick(&mut session);
        let (x, y) = session.view.world_to_screen(0.0, 0.0, 0.0);
        scheduler.cursor_moved(x, y);
        assert_eq!(scheduler.tick(&mut session).tooltip, TooltipUpdate::Hide);
    }
}
