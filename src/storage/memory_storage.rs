use crate::{
    domain::{Board, BoardConfig},
    error::{LeadboardError, Result},
    storage::BoardStore,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-memory storage holding the board in its serialized form, so loads
/// go through the same validation as boards read from disk
#[derive(Default)]
pub struct MemoryStorage {
    config: BoardConfig,
    board: RwLock<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BoardConfig) -> Self {
        Self {
            config,
            board: RwLock::new(None),
        }
    }
}

#[async_trait]
impl BoardStore for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        let mut slot = self.board.write().await;
        if slot.is_none() {
            let board = Board::new(self.config.clone());
            *slot = Some(serde_json::to_string(&board)?);
        }
        Ok(())
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        let json = serde_json::to_string(board)?;
        *self.board.write().await = Some(json);
        Ok(())
    }

    async fn load_board(&self) -> Result<Board> {
        let slot = self.board.read().await;
        let json = slot.as_deref().ok_or(LeadboardError::BoardNotInitialized)?;
        Ok(serde_json::from_str(json)?)
    }

    async fn is_initialized(&self) -> bool {
        self.board.read().await.is_some()
    }
}
