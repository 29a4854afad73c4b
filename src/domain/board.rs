use crate::{
    domain::{
        card::{Card, CardId, CardPayload},
        column::{normalize_label, Column, ColumnId},
    },
    error::{LeadboardError, Result},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Board configuration used to seed a fresh board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    pub columns: Vec<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Lead Pipeline".to_string(),
            columns: vec![
                "New Lead".to_string(),
                "Contacted".to_string(),
                "Viewing Scheduled".to_string(),
                "Offer Made".to_string(),
                "Closed".to_string(),
            ],
        }
    }
}

/// Result of a [`Board::move_card`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved {
        card_id: CardId,
        from: ColumnId,
        to: ColumnId,
        index: usize,
    },
    /// Source and destination were the same column
    Unchanged,
}

/// Serialized shape of a board: `{name, columns: [{id, label, card_ids}], cards: {id -> card}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoardData {
    #[serde(default)]
    name: String,
    columns: Vec<Column>,
    #[serde(default)]
    cards: HashMap<CardId, Card>,
}

/// Pipeline board state.
///
/// Columns own the ordering of their cards; `locations` is a derived index
/// from card to owning column and is rebuilt whenever a board is
/// deserialized. Every mutation validates first and only then touches state,
/// so a rejected call leaves the board exactly as it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoardData", into = "BoardData")]
pub struct Board {
    name: String,
    columns: Vec<Column>,
    cards: HashMap<CardId, Card>,
    locations: HashMap<CardId, ColumnId>,
}

impl Board {
    /// Creates an empty board with one column per configured label.
    ///
    /// Blank labels are skipped; if nothing remains a single "Backlog" column
    /// is created so the board always has at least one column.
    pub fn new(config: BoardConfig) -> Self {
        let mut columns: Vec<Column> = config
            .columns
            .iter()
            .filter_map(|label| normalize_label(label))
            .map(Column::new)
            .collect();
        if columns.is_empty() {
            columns.push(Column::new("Backlog".to_string()));
        }

        Self {
            name: config.name,
            columns,
            cards: HashMap::new(),
            locations: HashMap::new(),
        }
    }

    /// Assembles a board from stored parts, validating the partition invariant
    pub fn from_parts(
        name: String,
        columns: Vec<Column>,
        cards: impl IntoIterator<Item = Card>,
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(LeadboardError::InvalidBoard(
                "board has no columns".to_string(),
            ));
        }

        let mut column_ids = HashSet::new();
        let mut locations = HashMap::new();
        for column in &columns {
            if !column_ids.insert(column.id) {
                return Err(LeadboardError::InvalidBoard(format!(
                    "duplicate column {}",
                    column.id
                )));
            }
            for card_id in &column.card_ids {
                if locations.insert(*card_id, column.id).is_some() {
                    return Err(LeadboardError::InvalidBoard(format!(
                        "card {} appears more than once",
                        card_id
                    )));
                }
            }
        }

        let mut card_map = HashMap::new();
        for card in cards {
            if !locations.contains_key(&card.id) {
                return Err(LeadboardError::InvalidBoard(format!(
                    "card {} is not placed in any column",
                    card.id
                )));
            }
            card_map.insert(card.id, card);
        }

        if let Some(missing) = locations.keys().find(|id| !card_map.contains_key(id)) {
            return Err(LeadboardError::InvalidBoard(format!(
                "column references unknown card {}",
                missing
            )));
        }

        Ok(Self {
            name,
            columns,
            cards: card_map,
            locations,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in display order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|col| &col.id == id)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// All cards in board order (column by column, top to bottom)
    pub fn cards(&self) -> impl Iterator<Item = &Card> + '_ {
        self.columns
            .iter()
            .flat_map(|col| col.card_ids.iter())
            .filter_map(|id| self.cards.get(id))
    }

    /// Cards of one column in display order
    pub fn cards_in(&self, column_id: &ColumnId) -> Option<Vec<&Card>> {
        self.column(column_id).map(|col| {
            col.card_ids
                .iter()
                .filter_map(|id| self.cards.get(id))
                .collect()
        })
    }

    /// Column currently holding a card
    pub fn column_of(&self, card_id: &CardId) -> Option<ColumnId> {
        self.locations.get(card_id).copied()
    }

    /// Owning column and ordinal of a card
    pub fn locate(&self, card_id: &CardId) -> Option<(ColumnId, usize)> {
        let column_id = self.column_of(card_id)?;
        let position = self.column(&column_id)?.position_of(card_id)?;
        Some((column_id, position))
    }

    /// Searches cards by title, description or detail values (case-insensitive)
    pub fn search(&self, query: &str) -> Vec<&Card> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.cards()
            .filter(|card| card.payload.matches(&needle))
            .collect()
    }

    /// Appends a new empty column
    pub fn add_column(&mut self, label: &str) -> Result<ColumnId> {
        let label = normalize_label(label).ok_or(LeadboardError::EmptyLabel)?;
        let column = Column::new(label);
        let id = column.id;
        self.columns.push(column);
        Ok(id)
    }

    /// Renames a column. Returns `false` when the label is already current.
    pub fn rename_column(&mut self, column_id: &ColumnId, label: &str) -> Result<bool> {
        let label = normalize_label(label).ok_or(LeadboardError::EmptyLabel)?;
        let column = self.column_mut(column_id)?;
        if column.label == label {
            return Ok(false);
        }
        column.label = label;
        Ok(true)
    }

    /// Deletes a column along with its cards, which are returned.
    ///
    /// The last remaining column can't be deleted.
    pub fn delete_column(&mut self, column_id: &ColumnId) -> Result<Vec<Card>> {
        let index = self.column_index(column_id)?;
        if self.columns.len() == 1 {
            return Err(LeadboardError::LastColumn);
        }

        let column = self.columns.remove(index);
        let removed = column
            .card_ids
            .iter()
            .filter_map(|id| {
                self.locations.remove(id);
                self.cards.remove(id)
            })
            .collect();
        Ok(removed)
    }

    /// Appends a new card to the end of a column
    pub fn add_card(&mut self, column_id: &ColumnId, payload: CardPayload) -> Result<CardId> {
        let column = self.column_mut(column_id)?;
        let card = Card::new(payload);
        let id = card.id;
        column.insert_card(id, None);
        self.locations.insert(id, *column_id);
        self.cards.insert(id, card);
        Ok(id)
    }

    /// Replaces a card's payload
    pub fn update_card(&mut self, card_id: &CardId, payload: CardPayload) -> Result<()> {
        let card = self
            .cards
            .get_mut(card_id)
            .ok_or(LeadboardError::CardNotFound(*card_id))?;
        card.set_payload(payload);
        Ok(())
    }

    /// Removes a card from the board
    pub fn delete_card(&mut self, card_id: &CardId) -> Result<Card> {
        let column_id = self
            .column_of(card_id)
            .ok_or(LeadboardError::CardNotFound(*card_id))?;
        let column = self.column_mut(&column_id)?;
        column.remove_card(card_id);
        self.locations.remove(card_id);
        self.cards
            .remove(card_id)
            .ok_or(LeadboardError::CardNotFound(*card_id))
    }

    /// Moves a card between columns.
    ///
    /// `at` is clamped to the destination length; `None` appends. Moving a
    /// card onto its own column is a no-op regardless of `at`.
    pub fn move_card(
        &mut self,
        card_id: &CardId,
        from: &ColumnId,
        to: &ColumnId,
        at: Option<usize>,
    ) -> Result<MoveOutcome> {
        match self.column_of(card_id) {
            None => return Err(LeadboardError::CardNotFound(*card_id)),
            Some(owner) if &owner != from => {
                return Err(LeadboardError::CardNotInColumn {
                    card: *card_id,
                    column: *from,
                })
            }
            Some(_) => {}
        }

        if from == to {
            return Ok(MoveOutcome::Unchanged);
        }

        let from_index = self.column_index(from)?;
        let to_index = self.column_index(to)?;

        self.columns[from_index].remove_card(card_id);
        let index = self.columns[to_index].insert_card(*card_id, at);
        self.locations.insert(*card_id, *to);

        Ok(MoveOutcome::Moved {
            card_id: *card_id,
            from: *from,
            to: *to,
            index,
        })
    }

    /// Verifies the partition invariant: every card sits in exactly one
    /// column and the location index agrees with the columns
    pub fn check_invariants(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(LeadboardError::InvalidBoard(
                "board has no columns".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            for card_id in &column.card_ids {
                if !seen.insert(*card_id) {
                    return Err(LeadboardError::InvalidBoard(format!(
                        "card {} appears more than once",
                        card_id
                    )));
                }
                if self.locations.get(card_id) != Some(&column.id) {
                    return Err(LeadboardError::InvalidBoard(format!(
                        "location index out of sync for card {}",
                        card_id
                    )));
                }
                if !self.cards.contains_key(card_id) {
                    return Err(LeadboardError::InvalidBoard(format!(
                        "column references unknown card {}",
                        card_id
                    )));
                }
            }
        }

        if seen.len() != self.cards.len() || seen.len() != self.locations.len() {
            return Err(LeadboardError::InvalidBoard(
                "orphaned cards present".to_string(),
            ));
        }
        Ok(())
    }

    fn column_index(&self, column_id: &ColumnId) -> Result<usize> {
        self.columns
            .iter()
            .position(|col| &col.id == column_id)
            .ok_or(LeadboardError::ColumnNotFound(*column_id))
    }

    fn column_mut(&mut self, column_id: &ColumnId) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|col| &col.id == column_id)
            .ok_or(LeadboardError::ColumnNotFound(*column_id))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl TryFrom<BoardData> for Board {
    type Error = LeadboardError;

    fn try_from(data: BoardData) -> Result<Self> {
        Board::from_parts(data.name, data.columns, data.cards.into_values())
    }
}

impl From<Board> for BoardData {
    fn from(board: Board) -> Self {
        Self {
            name: board.name,
            columns: board.columns,
            cards: board.cards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_columns() -> (Board, ColumnId, ColumnId) {
        let config = BoardConfig {
            name: "Test".to_string(),
            columns: vec!["A".to_string(), "B".to_string()],
        };
        let board = Board::new(config);
        let a = board.columns()[0].id;
        let b = board.columns()[1].id;
        (board, a, b)
    }

    #[test]
    fn test_board_creation() {
        let board = Board::default();
        assert_eq!(board.column_count(), 5);
        assert_eq!(board.card_count(), 0);
        assert_eq!(board.columns()[0].label, "New Lead");
    }

    #[test]
    fn test_board_without_labels_gets_one_column() {
        let board = Board::new(BoardConfig {
            name: "Empty".to_string(),
            columns: vec!["  ".to_string()],
        });
        assert_eq!(board.column_count(), 1);
        assert_eq!(board.columns()[0].label, "Backlog");
    }

    #[test]
    fn test_cross_column_move_appends() {
        let (mut board, a, b) = two_columns();
        let c1 = board.add_card(&a, CardPayload::new("c1")).unwrap();
        let c2 = board.add_card(&a, CardPayload::new("c2")).unwrap();

        let outcome = board.move_card(&c1, &a, &b, None).unwrap();

        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                card_id: c1,
                from: a,
                to: b,
                index: 0
            }
        );
        assert_eq!(board.column(&a).unwrap().card_ids, vec![c2]);
        assert_eq!(board.column(&b).unwrap().card_ids, vec![c1]);
        assert_eq!(board.locate(&c1), Some((b, 0)));
        assert_eq!(board.locate(&c2), Some((a, 0)));
        board.check_invariants().unwrap();
    }

    #[test]
    fn test_move_lands_at_end_of_destination() {
        let (mut board, a, b) = two_columns();
        let c1 = board.add_card(&a, CardPayload::new("c1")).unwrap();
        board.add_card(&b, CardPayload::new("c2")).unwrap();
        board.add_card(&b, CardPayload::new("c3")).unwrap();

        board.move_card(&c1, &a, &b, None).unwrap();

        let dest = board.column(&b).unwrap();
        assert_eq!(dest.position_of(&c1), Some(dest.len() - 1));
        assert!(board.column(&a).unwrap().is_empty());
    }

    #[test]
    fn test_move_with_index() {
        let (mut board, a, b) = two_columns();
        let c1 = board.add_card(&a, CardPayload::new("c1")).unwrap();
        let c2 = board.add_card(&b, CardPayload::new("c2")).unwrap();

        board.move_card(&c1, &a, &b, Some(0)).unwrap();
        assert_eq!(board.column(&b).unwrap().card_ids, vec![c1, c2]);
    }

    #[test]
    fn test_same_column_move_is_noop() {
        let (mut board, a, b) = two_columns();
        let c1 = board.add_card(&a, CardPayload::new("c1")).unwrap();
        board.add_card(&b, CardPayload::new("c2")).unwrap();
        let before = board.clone();

        let outcome = board.move_card(&c1, &a, &a, Some(5)).unwrap();

        assert_eq!(outcome, MoveOutcome::Unchanged);
        assert_eq!(board, before);
    }

    #[test]
    fn test_move_rejects_wrong_source() {
        let (mut board, a, b) = two_columns();
        let c1 = board.add_card(&a, CardPayload::new("c1")).unwrap();
        let before = board.clone();

        let err = board.move_card(&c1, &b, &a, None).unwrap_err();
        assert!(matches!(err, LeadboardError::CardNotInColumn { .. }));

        let err = board.move_card(&CardId::new(), &a, &b, None).unwrap_err();
        assert!(matches!(err, LeadboardError::CardNotFound(_)));

        let err = board.move_card(&c1, &a, &ColumnId::new(), None).unwrap_err();
        assert!(matches!(err, LeadboardError::ColumnNotFound(_)));

        assert_eq!(board, before);
    }

    #[test]
    fn test_add_column_rejects_blank_label() {
        let (mut board, _, _) = two_columns();

        assert!(matches!(
            board.add_column(""),
            Err(LeadboardError::EmptyLabel)
        ));
        assert!(matches!(
            board.add_column("   "),
            Err(LeadboardError::EmptyLabel)
        ));
        assert_eq!(board.column_count(), 2);
    }

    #[test]
    fn test_add_column_then_card() {
        let (mut board, _, _) = two_columns();
        let follow_up = board.add_column("Follow-up").unwrap();
        let card = board
            .add_card(&follow_up, CardPayload::new("Jane Doe"))
            .unwrap();

        assert_eq!(board.columns().last().unwrap().id, follow_up);
        assert_eq!(board.column(&follow_up).unwrap().len(), 1);
        assert_eq!(board.locate(&card), Some((follow_up, 0)));
    }

    #[test]
    fn test_rename_column() {
        let (mut board, a, _) = two_columns();

        assert!(board.rename_column(&a, "Qualified").unwrap());
        assert_eq!(board.column(&a).unwrap().label, "Qualified");

        assert!(!board.rename_column(&a, "Qualified").unwrap());
        assert!(matches!(
            board.rename_column(&a, " "),
            Err(LeadboardError::EmptyLabel)
        ));
        assert!(matches!(
            board.rename_column(&ColumnId::new(), "X"),
            Err(LeadboardError::ColumnNotFound(_))
        ));
        assert_eq!(board.column(&a).unwrap().label, "Qualified");
    }

    #[test]
    fn test_delete_last_column_rejected() {
        let mut board = Board::new(BoardConfig {
            name: "Solo".to_string(),
            columns: vec!["A".to_string()],
        });
        let a = board.columns()[0].id;
        board.add_card(&a, CardPayload::new("c1")).unwrap();
        let before = board.clone();

        assert!(matches!(
            board.delete_column(&a),
            Err(LeadboardError::LastColumn)
        ));
        assert_eq!(board, before);
    }

    #[test]
    fn test_delete_column_discards_cards() {
        let (mut board, a, b) = two_columns();
        let c1 = board.add_card(&a, CardPayload::new("c1")).unwrap();
        let c2 = board.add_card(&b, CardPayload::new("c2")).unwrap();

        let removed = board.delete_column(&a).unwrap();

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, c1);
        assert!(board.card(&c1).is_none());
        assert!(board.column_of(&c1).is_none());
        assert_eq!(board.card_count(), 1);
        assert_eq!(board.locate(&c2), Some((b, 0)));
        board.check_invariants().unwrap();
    }

    #[test]
    fn test_update_and_delete_card() {
        let (mut board, a, _) = two_columns();
        let c1 = board.add_card(&a, CardPayload::new("c1")).unwrap();
        let c2 = board.add_card(&a, CardPayload::new("c2")).unwrap();

        board
            .update_card(&c1, CardPayload::new("c1 renamed"))
            .unwrap();
        assert_eq!(board.card(&c1).unwrap().title(), "c1 renamed");

        let removed = board.delete_card(&c1).unwrap();
        assert_eq!(removed.id, c1);
        assert_eq!(board.locate(&c2), Some((a, 0)));
        assert!(matches!(
            board.delete_card(&c1),
            Err(LeadboardError::CardNotFound(_))
        ));
        assert!(matches!(
            board.update_card(&c1, CardPayload::new("gone")),
            Err(LeadboardError::CardNotFound(_))
        ));
        board.check_invariants().unwrap();
    }

    #[test]
    fn test_add_card_unknown_column() {
        let (mut board, _, _) = two_columns();
        assert!(matches!(
            board.add_card(&ColumnId::new(), CardPayload::new("x")),
            Err(LeadboardError::ColumnNotFound(_))
        ));
        assert_eq!(board.card_count(), 0);
    }

    #[test]
    fn test_search_in_board_order() {
        let (mut board, a, b) = two_columns();
        let jane = board
            .add_card(&b, CardPayload::new("Jane Doe").with_description("Sandton"))
            .unwrap();
        let john = board
            .add_card(&a, CardPayload::new("John").with_detail("area", "sandton"))
            .unwrap();
        board.add_card(&a, CardPayload::new("Mary")).unwrap();

        let ids: Vec<CardId> = board.search("SANDTON").iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![john, jane]);
        assert!(board.search("  ").is_empty());
    }

    #[test]
    fn test_serialization_roundtrip_rebuilds_index() {
        let (mut board, a, b) = two_columns();
        let c1 = board.add_card(&a, CardPayload::new("c1")).unwrap();
        board.add_card(&b, CardPayload::new("c2")).unwrap();

        let json = serde_json::to_string(&board).unwrap();
        assert!(!json.contains("locations"));

        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
        assert_eq!(back.locate(&c1), Some((a, 0)));
    }

    #[test]
    fn test_deserialize_rejects_broken_partition() {
        let card = CardId::new();
        let json = format!(
            r#"{{
                "name": "Broken",
                "columns": [
                    {{"id": "{}", "label": "A", "card_ids": ["{card}"]}},
                    {{"id": "{}", "label": "B", "card_ids": ["{card}"]}}
                ],
                "cards": {{}}
            }}"#,
            ColumnId::new(),
            ColumnId::new(),
        );
        assert!(serde_json::from_str::<Board>(&json).is_err());

        let no_columns = r#"{"name": "Empty", "columns": [], "cards": {}}"#;
        assert!(serde_json::from_str::<Board>(no_columns).is_err());
    }

    #[test]
    fn test_from_parts_rejects_orphan_card() {
        let column = Column::new("A".to_string());
        let orphan = Card::new(CardPayload::new("orphan"));
        let result = Board::from_parts("Test".to_string(), vec![column], vec![orphan]);
        assert!(matches!(result, Err(LeadboardError::InvalidBoard(_))));
    }

    #[derive(Debug, Clone)]
    enum Op {
        AddColumn(String),
        DeleteColumn(usize),
        AddCard(usize),
        DeleteCard(usize),
        Move(usize, usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            "[a-z ]{0,6}".prop_map(Op::AddColumn),
            (0usize..8).prop_map(Op::DeleteColumn),
            (0usize..8).prop_map(Op::AddCard),
            (0usize..32).prop_map(Op::DeleteCard),
            (0usize..32, 0usize..8).prop_map(|(card, col)| Op::Move(card, col)),
        ]
    }

    proptest! {
        #[test]
        fn partition_invariant_holds(ops in prop::collection::vec(op_strategy(), 1..60)) {
            let (mut board, _, _) = two_columns();

            for op in ops {
                let before_total = board.card_count();
                match op {
                    Op::AddColumn(label) => {
                        let _ = board.add_column(&label);
                    }
                    Op::DeleteColumn(i) => {
                        let id = board.columns()[i % board.column_count()].id;
                        let _ = board.delete_column(&id);
                    }
                    Op::AddCard(i) => {
                        let id = board.columns()[i % board.column_count()].id;
                        board.add_card(&id, CardPayload::new("lead")).unwrap();
                    }
                    Op::DeleteCard(i) => {
                        let ids: Vec<CardId> = board.cards().map(|c| c.id).collect();
                        if !ids.is_empty() {
                            board.delete_card(&ids[i % ids.len()]).unwrap();
                        }
                    }
                    Op::Move(card, col) => {
                        let ids: Vec<CardId> = board.cards().map(|c| c.id).collect();
                        if !ids.is_empty() {
                            let card_id = ids[card % ids.len()];
                            let from = board.column_of(&card_id).unwrap();
                            let to = board.columns()[col % board.column_count()].id;
                            let from_len = board.column(&from).unwrap().len();
                            let to_len = board.column(&to).unwrap().len();

                            board.move_card(&card_id, &from, &to, None).unwrap();

                            prop_assert_eq!(board.card_count(), before_total);
                            if from != to {
                                prop_assert_eq!(board.column(&from).unwrap().len(), from_len - 1);
                                prop_assert_eq!(board.column(&to).unwrap().len(), to_len + 1);
                                prop_assert_eq!(board.locate(&card_id), Some((to, to_len)));
                            }
                        }
                    }
                }
                prop_assert!(board.check_invariants().is_ok());
                prop_assert!(board.column_count() >= 1);
            }
        }
    }
}
