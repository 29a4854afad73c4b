use crate::{domain::Board, error::Result};
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Storage trait for loading and persisting the pipeline board
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Initializes the storage backend with a default board if it holds none
    async fn initialize(&self) -> Result<()>;

    /// Saves the board state
    async fn save_board(&self, board: &Board) -> Result<()>;

    /// Loads the board state
    async fn load_board(&self) -> Result<Board>;

    /// Checks if a board has been stored
    async fn is_initialized(&self) -> bool;
}

/// Saves every snapshot published on `snapshots` until the sending
/// controller is dropped.
///
/// Only the newest snapshot is written when several commits land between
/// two saves. A failed save is logged and retried with the next snapshot.
pub async fn persist_changes(
    store: Arc<dyn BoardStore>,
    mut snapshots: watch::Receiver<Arc<Board>>,
) {
    while snapshots.changed().await.is_ok() {
        let board = snapshots.borrow_and_update().clone();
        match save_snapshot(&*store, &board).await {
            Ok(()) => tracing::debug!("Persisted board '{}'", board.name()),
            Err(err) => tracing::error!("{:#}", err),
        }
    }
}

async fn save_snapshot(store: &dyn BoardStore, board: &Board) -> anyhow::Result<()> {
    store
        .save_board(board)
        .await
        .with_context(|| format!("Failed to persist board '{}'", board.name()))
}
