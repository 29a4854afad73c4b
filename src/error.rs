use crate::domain::{CardId, ColumnId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LeadboardError>;

#[derive(Debug, Error)]
pub enum LeadboardError {
    #[error("Column label must not be empty")]
    EmptyLabel,

    #[error("Column not found: {0}")]
    ColumnNotFound(ColumnId),

    #[error("Card not found: {0}")]
    CardNotFound(CardId),

    #[error("Card {card} is not in column {column}")]
    CardNotInColumn { card: CardId, column: ColumnId },

    #[error("Cannot delete the last remaining column")]
    LastColumn,

    #[error("Invalid id format: {0}")]
    InvalidId(String),

    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    #[error("Board not initialized")]
    BoardNotInitialized,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl LeadboardError {
    /// True for errors that reject a command without touching the board
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::EmptyLabel
                | Self::ColumnNotFound(_)
                | Self::CardNotFound(_)
                | Self::CardNotInColumn { .. }
                | Self::LastColumn
        )
    }
}
