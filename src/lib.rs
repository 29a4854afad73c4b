//! # Leadboard Core
//!
//! Pipeline board engine for the broker lead dashboard.
//!
//! This crate owns the structure of the lead pipeline (columns holding
//! ordered cards) and the drag-and-drop engine that moves cards between
//! columns: pointer tracking, drop-zone hit-testing and the ordered-list
//! mutations behind a drop. Rendering, input wiring and persistence backends
//! sit outside; they talk to the engine through [`BoardController`], the
//! [`RegionRegistry`] capability and the [`BoardStore`] trait.

pub mod controller;
pub mod domain;
pub mod drag;
pub mod error;
pub mod input;
pub mod storage;

// Re-export commonly used types
pub use controller::{BoardController, CommandOutput, NoOpReason, PointerOutcome, SubscriptionId};
pub use domain::{
    board::{Board, BoardConfig, MoveOutcome},
    card::{Card, CardId, CardPayload},
    column::{Column, ColumnId},
    geometry::{Point, Rect},
};
pub use drag::{DragSession, HitTester, RegionRegistry};
pub use error::{LeadboardError, Result};
pub use input::{PointerDevice, PointerEvent, PointerKind};
pub use storage::BoardStore;
