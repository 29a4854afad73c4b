use crate::domain::{CardId, Point};
use serde::{Deserialize, Serialize};

/// Phase of a pointer gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
}

/// Input device class the event came from.
///
/// Informational only: every device drives the same drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerDevice {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Unified pointer event consumed by the board controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub point: Point,
    /// Card whose grip received a `Down` event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_card: Option<CardId>,
    #[serde(default)]
    pub device: PointerDevice,
}

impl PointerEvent {
    pub fn down(card_id: CardId, point: Point) -> Self {
        Self {
            kind: PointerKind::Down,
            point,
            target_card: Some(card_id),
            device: PointerDevice::default(),
        }
    }

    pub fn moved(point: Point) -> Self {
        Self::bare(PointerKind::Move, point)
    }

    pub fn up(point: Point) -> Self {
        Self::bare(PointerKind::Up, point)
    }

    pub fn cancel(point: Point) -> Self {
        Self::bare(PointerKind::Cancel, point)
    }

    pub fn with_device(mut self, device: PointerDevice) -> Self {
        self.device = device;
        self
    }

    fn bare(kind: PointerKind, point: Point) -> Self {
        Self {
            kind,
            point,
            target_card: None,
            device: PointerDevice::default(),
        }
    }
}
