use crate::domain::card::CardId;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Unique identifier for a pipeline column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(Uuid);

impl ColumnId {
    /// Generates a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ColumnId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ColumnId {
    type Err = crate::error::LeadboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| crate::error::LeadboardError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pipeline stage holding an ordered list of cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub label: String,
    pub card_ids: Vec<CardId>,
}

impl Column {
    pub fn new(label: String) -> Self {
        Self::with_id(ColumnId::new(), label)
    }

    pub fn with_id(id: ColumnId, label: String) -> Self {
        Self {
            id,
            label,
            card_ids: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.card_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.card_ids.is_empty()
    }

    /// Ordinal of a card within this column
    pub fn position_of(&self, card_id: &CardId) -> Option<usize> {
        self.card_ids.iter().position(|id| id == card_id)
    }

    pub fn contains(&self, card_id: &CardId) -> bool {
        self.position_of(card_id).is_some()
    }

    /// Inserts at `index` clamped to the column length; `None` appends.
    /// Returns the ordinal the card landed at.
    pub(crate) fn insert_card(&mut self, card_id: CardId, index: Option<usize>) -> usize {
        let at = index.map_or(self.card_ids.len(), |i| i.min(self.card_ids.len()));
        self.card_ids.insert(at, card_id);
        at
    }

    pub(crate) fn remove_card(&mut self, card_id: &CardId) -> Option<usize> {
        let pos = self.position_of(card_id)?;
        self.card_ids.remove(pos);
        Some(pos)
    }
}

/// Normalizes a user supplied column label, rejecting blank input
pub(crate) fn normalize_label(label: &str) -> Option<String> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
