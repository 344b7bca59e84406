use picfly_types::{OverlayEvent, Point, SelectionRect};

use crate::overlay::DAMAGE_MARGIN;

/// Lifecycle of one selector invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Dragging { anchor: Point, current: Point },
    Finalized(SelectionRect),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Selected(SelectionRect),
    Cancelled,
}

/// What the overlay has to do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Ignored,
    /// Repaint `damage`; `selection` is the live rectangle, empty right after button-down
    Redraw {
        selection: SelectionRect,
        damage: SelectionRect,
    },
    Finished(SelectionOutcome),
}

/// Drag-selection state machine, in overlay-local coordinates.
///
/// Knows nothing about windows or pixels: the selector feeds it overlay events and acts on
/// the returned [`Step`].
pub struct SelectionSession {
    state: SessionState,
    extent: SelectionRect,
    min_extent: u32,
    last_drawn: Option<SelectionRect>,
}

impl SelectionSession {
    pub fn new(extent: SelectionRect, min_extent: u32) -> Self {
        Self {
            state: SessionState::Idle,
            extent,
            min_extent,
            last_drawn: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn activate(&mut self) {
        if self.state == SessionState::Idle {
            self.state = SessionState::Active;
            self.last_drawn = None;
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self.state,
            SessionState::Active | SessionState::Dragging { .. }
        )
    }

    pub fn handle(&mut self, event: OverlayEvent) -> Step {
        if !self.is_running() {
            return Step::Ignored;
        }

        match (self.state, event) {
            (_, OverlayEvent::Cancel | OverlayEvent::Closed) => self.cancel(),

            (_, OverlayEvent::PointerDown(p)) => {
                let anchor = self.clamp_point(p);
                self.state = SessionState::Dragging {
                    anchor,
                    current: anchor,
                };
                self.redraw(SelectionRect::from_corners(anchor, anchor))
            }

            (SessionState::Dragging { anchor, current }, OverlayEvent::PointerMove(p)) => {
                let p = self.clamp_point(p);
                if p == current {
                    return Step::Ignored;
                }
                self.state = SessionState::Dragging { anchor, current: p };
                self.redraw(SelectionRect::from_corners(anchor, p))
            }

            (SessionState::Dragging { anchor, .. }, OverlayEvent::PointerUp(p)) => {
                let rect = SelectionRect::from_corners(anchor, self.clamp_point(p));
                match rect.intersect(&self.extent) {
                    Some(rect)
                        if rect.width() >= self.min_extent && rect.height() >= self.min_extent =>
                    {
                        self.state = SessionState::Finalized(rect);
                        Step::Finished(SelectionOutcome::Selected(rect))
                    }
                    _ => {
                        tracing::debug!(?rect, "selection too small, treating as a stray click");
                        self.cancel()
                    }
                }
            }

            // Moves before any button-down, or an up we never saw go down
            (_, OverlayEvent::PointerMove(_) | OverlayEvent::PointerUp(_)) => Step::Ignored,
        }
    }

    /// Abort from outside the event stream
    pub fn cancel(&mut self) -> Step {
        if !self.is_running() {
            return Step::Ignored;
        }
        self.state = SessionState::Cancelled;
        Step::Finished(SelectionOutcome::Cancelled)
    }

    /// `Finalized | Cancelled -> Idle`
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.last_drawn = None;
    }

    fn redraw(&mut self, selection: SelectionRect) -> Step {
        let damage = match self.last_drawn {
            Some(previous) => previous.union(&selection),
            None => selection,
        }
        .inflate(DAMAGE_MARGIN);
        self.last_drawn = Some(selection);
        Step::Redraw { selection, damage }
    }

    /// Edges are inclusive so a drag can reach the last row and column.
    fn clamp_point(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.extent.x0, self.extent.x1),
            p.y.clamp(self.extent.y0, self.extent.y1),
        )
    }
}
