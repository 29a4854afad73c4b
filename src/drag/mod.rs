//! Drag-and-drop plumbing: drop-zone hit-testing and the drag state machine.

pub mod session;

pub use hit_test::{HitTester, RegionRegistry};
pub use session::{DragResolution, DragSession, DragState};
