pub mod board;
pub mod card;
pub mod column;
pub mod geometry;

pub use board::{Board, BoardConfig, MoveOutcome};
pub use card::{Card, CardId, CardPayload};
pub use column::{Column, ColumnId};
pub use geometry::{Point, Rect};
