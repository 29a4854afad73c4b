use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Unique identifier for a card on the pipeline board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(Uuid);

impl CardId {
    /// Generates a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for CardId {
    type Err = crate::error::LeadboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| crate::error::LeadboardError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display data carried by a card.
///
/// The board engine never interprets the payload; it is stored and handed
/// back to the presentation layer as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CardPayload {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl CardPayload {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            details: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Case-insensitive match against title, description and string details.
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        if self.title.to_lowercase().contains(needle) {
            return true;
        }

        let description_matches = self
            .description
            .as_ref()
            .map(|d| d.to_lowercase().contains(needle))
            .unwrap_or(false);
        if description_matches {
            return true;
        }

        self.details.values().any(|value| match value {
            Value::String(s) => s.to_lowercase().contains(needle),
            Value::Number(n) => n.to_string().contains(needle),
            _ => false,
        })
    }
}

/// A lead tracked on the pipeline board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub payload: CardPayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Creates a card with a freshly generated id
    pub fn new(payload: CardPayload) -> Self {
        Self::with_id(CardId::new(), payload)
    }

    pub fn with_id(id: CardId, payload: CardPayload) -> Self {
        let now = Utc::now();
        Self {
            id,
            payload,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the payload
    pub fn set_payload(&mut self, payload: CardPayload) {
        self.payload = payload;
        self.updated_at = Utc::now();
    }

    pub fn title(&self) -> &str {
        &self.payload.title
    }
}
