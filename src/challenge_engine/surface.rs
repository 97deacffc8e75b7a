//! Observer interfaces the session pushes to.
//!
//! The session never reads anything back from these; they are notified of
//! every change and may ignore any of them (all methods default to no-ops).

use serde::Serialize;

use crate::challenge_engine::models::{CellOutcome, ContentItem, Screen};

/// Draws grid cells.
pub trait RenderSurface {
    fn render_cell(&mut self, _position: usize, _content: &ContentItem, _is_target: bool) {}
    fn update_cell_visual(&mut self, _position: usize, _outcome: CellOutcome) {}
}

/// Shows screens and the win / failure outcome.
pub trait OutcomePresenter {
    fn show_screen(&mut self, _screen: Screen) {}
    fn notify_won(&mut self) {}
    fn notify_failed(&mut self) {}
    fn notify_failure_dismissed(&mut self) {}
}

/// Surface that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl RenderSurface for NullSurface {}
impl OutcomePresenter for NullSurface {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SurfaceEvent {
    RenderCell { position: usize, content_id: String, is_target: bool },
    CellVisual { position: usize, outcome: CellOutcome },
    Screen(Screen),
    Won,
    Failed,
    FailureDismissed,
}

/// Surface that keeps every call in order. Used by tests and the demo.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub events: Vec<SurfaceEvent>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&SurfaceEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(*e)).count()
    }
}

impl RenderSurface for RecordingSurface {
    fn render_cell(&mut self, position: usize, content: &ContentItem, is_target: bool) {
        self.events.push(SurfaceEvent::RenderCell {
            position,
            content_id: content.id.clone(),
            is_target,
        });
    }

    fn update_cell_visual(&mut self, position: usize, outcome: CellOutcome) {
        self.events.push(SurfaceEvent::CellVisual { position, outcome });
    }
}

impl OutcomePresenter for RecordingSurface {
    fn show_screen(&mut self, screen: Screen) {
        self.events.push(SurfaceEvent::Screen(screen));
    }

    fn notify_won(&mut self) {
        self.events.push(SurfaceEvent::Won);
    }

    fn notify_failed(&mut self) {
        self.events.push(SurfaceEvent::Failed);
    }

    fn notify_failure_dismissed(&mut self) {
        self.events.push(SurfaceEvent::FailureDismissed);
    }
}
