use crate::domain::{CardId, ColumnId, Point};

/// One in-flight drag gesture.
///
/// Created on pointer-down over a card grip and dropped when the gesture
/// is released or cancelled. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub card_id: CardId,
    pub origin: ColumnId,
    pub start: Point,
    pub current: Point,
    /// Column under the pointer at the last move, `None` when off every drop zone
    pub hovered: Option<ColumnId>,
}

impl DragSession {
    pub fn new(card_id: CardId, origin: ColumnId, start: Point) -> Self {
        Self {
            card_id,
            origin,
            start,
            current: start,
            hovered: None,
        }
    }

    /// Records the latest pointer position and the column beneath it
    pub fn update(&mut self, point: Point, hovered: Option<ColumnId>) {
        self.current = point;
        self.hovered = hovered;
    }

    /// Offset from start to current position as `(dx, dy)`
    pub fn delta(&self) -> (f64, f64) {
        self.current.offset_from(self.start)
    }

    /// Straight-line distance travelled since the drag started
    pub fn distance(&self) -> f64 {
        let (dx, dy) = self.delta();
        dx.hypot(dy)
    }

    /// The column a release right now would move the card into
    pub fn drop_target(&self) -> Option<ColumnId> {
        self.hovered.filter(|target| target != &self.origin)
    }
}

/// How a finished gesture resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragResolution {
    /// Released over a different column
    Move {
        card_id: CardId,
        from: ColumnId,
        to: ColumnId,
    },
    /// Released outside every drop zone
    NoTarget,
    /// Released over the origin column
    SameColumn,
}

/// Drag state machine: at most one session exists at a time
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match self {
            Self::Idle => None,
            Self::Dragging(session) => Some(session),
        }
    }

    /// Starts a drag. Returns `false` and keeps the current session if one
    /// is already running.
    pub fn begin(&mut self, card_id: CardId, origin: ColumnId, start: Point) -> bool {
        if self.is_dragging() {
            return false;
        }
        *self = Self::Dragging(DragSession::new(card_id, origin, start));
        true
    }

    /// Applies a pointer move. Returns the updated session, or `None` when idle.
    pub fn track(&mut self, point: Point, hovered: Option<ColumnId>) -> Option<&DragSession> {
        match self {
            Self::Idle => None,
            Self::Dragging(session) => {
                session.update(point, hovered);
                Some(session)
            }
        }
    }

    /// Ends the gesture on release. Returns `None` when no drag was running.
    pub fn release(&mut self) -> Option<(DragSession, DragResolution)> {
        let session = self.take()?;
        let resolution = match session.hovered {
            None => DragResolution::NoTarget,
            Some(target) if target == session.origin => DragResolution::SameColumn,
            Some(target) => DragResolution::Move {
                card_id: session.card_id,
                from: session.origin,
                to: target,
            },
        };
        Some((session, resolution))
    }

    /// Abandons the gesture. Returns the dropped session, if any.
    pub fn cancel(&mut self) -> Option<DragSession> {
        self.take()
    }

    fn take(&mut self) -> Option<DragSession> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Dragging(session) => Some(session),
        }
    }
}
