//! Public façade over the board model and the drag engine.
//!
//! The controller exclusively owns the current [`Board`]. Each mutation is
//! applied to a private copy which replaces the published snapshot only on
//! success, so subscribers never observe a half-applied change and a
//! rejected command leaves the snapshot untouched.

use crate::{
    domain::{Board, Card, CardId, CardPayload, ColumnId, MoveOutcome, Point, Rect},
    drag::{DragResolution, DragSession, DragState, HitTester, RegionRegistry},
    error::{LeadboardError, Result},
    input::{PointerEvent, PointerKind},
    storage::BoardStore,
};
use std::sync::Arc;
use tokio::sync::watch;

type Subscriber = Box<dyn FnMut(&Arc<Board>) + Send>;

/// Handle returned by [`BoardController::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Value produced by a command together with the board snapshot after it
#[derive(Debug, Clone)]
pub struct CommandOutput<T> {
    pub value: T,
    pub board: Arc<Board>,
}

/// Why a finished gesture left the board untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    NoTarget,
    SameColumn,
    Cancelled,
}

/// Result of feeding one pointer event to the controller
#[derive(Debug)]
pub enum PointerOutcome {
    /// Event had no effect in the current drag state
    Ignored,
    DragStarted {
        card_id: CardId,
        origin: ColumnId,
    },
    /// Pointer moved during a drag; `target` is the column beneath it
    Tracking { target: Option<ColumnId> },
    /// Release moved the card into another column
    Committed {
        card_id: CardId,
        from: ColumnId,
        to: ColumnId,
        board: Arc<Board>,
    },
    NoOp(NoOpReason),
    /// The gesture's move was refused by the board, e.g. because the card
    /// or target column was deleted mid-drag
    Rejected(LeadboardError),
}

pub struct BoardController<R: RegionRegistry = HitTester> {
    board: Arc<Board>,
    drag: DragState,
    regions: R,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    snapshots: watch::Sender<Arc<Board>>,
}

impl BoardController<HitTester> {
    pub fn new(board: Board) -> Self {
        Self::with_registry(board, HitTester::new())
    }

    /// Loads the board from a store, initializing the store first if needed
    pub async fn open(store: &dyn BoardStore) -> Result<Self> {
        if !store.is_initialized().await {
            tracing::info!("Board store empty, initializing default board");
            store.initialize().await?;
        }
        let board = store.load_board().await?;
        tracing::info!(
            "Loaded board '{}' with {} columns and {} cards",
            board.name(),
            board.column_count(),
            board.card_count()
        );
        Ok(Self::new(board))
    }
}

impl<R: RegionRegistry> BoardController<R> {
    pub fn with_registry(board: Board, regions: R) -> Self {
        let board = Arc::new(board);
        let (snapshots, _) = watch::channel(Arc::clone(&board));
        Self {
            board,
            drag: DragState::Idle,
            regions,
            subscribers: Vec::new(),
            next_subscription: 0,
            snapshots,
        }
    }

    /// Current board snapshot
    pub fn board(&self) -> Arc<Board> {
        Arc::clone(&self.board)
    }

    /// The drag in progress, if any
    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.session()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn regions(&self) -> &R {
        &self.regions
    }

    pub fn register_region(&mut self, column_id: ColumnId, region: Rect) {
        self.regions.register(column_id, region);
    }

    pub fn unregister_region(&mut self, column_id: &ColumnId) -> bool {
        self.regions.unregister(column_id)
    }

    /// Registers a callback invoked with every committed snapshot
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Arc<Board>) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Channel receiving every committed snapshot, e.g. for persistence
    pub fn watch(&self) -> watch::Receiver<Arc<Board>> {
        self.snapshots.subscribe()
    }

    /// Replaces the board wholesale after an external reload.
    ///
    /// Any drag in progress is abandoned.
    pub fn reload(&mut self, board: Board) -> Arc<Board> {
        if let Some(session) = self.drag.cancel() {
            tracing::debug!("Drag of card {} abandoned by reload", session.card_id);
        }
        self.publish(Arc::new(board));
        self.board()
    }

    pub fn add_column(&mut self, label: &str) -> Result<CommandOutput<ColumnId>> {
        self.apply("add column", |board| board.add_column(label))
    }

    pub fn rename_column(
        &mut self,
        column_id: &ColumnId,
        label: &str,
    ) -> Result<CommandOutput<bool>> {
        self.apply("rename column", |board| board.rename_column(column_id, label))
    }

    /// Deletes a column together with its cards and drops its drop zone
    pub fn delete_column(&mut self, column_id: &ColumnId) -> Result<CommandOutput<Vec<Card>>> {
        let output = self.apply("delete column", |board| board.delete_column(column_id))?;
        self.regions.unregister(column_id);
        Ok(output)
    }

    pub fn add_card(
        &mut self,
        column_id: &ColumnId,
        payload: CardPayload,
    ) -> Result<CommandOutput<CardId>> {
        self.apply("add card", |board| board.add_card(column_id, payload))
    }

    pub fn update_card(
        &mut self,
        card_id: &CardId,
        payload: CardPayload,
    ) -> Result<CommandOutput<()>> {
        self.apply("update card", |board| board.update_card(card_id, payload))
    }

    pub fn delete_card(&mut self, card_id: &CardId) -> Result<CommandOutput<Card>> {
        self.apply("delete card", |board| board.delete_card(card_id))
    }

    /// Moves a card programmatically; drags go through the pointer entry points
    pub fn move_card(
        &mut self,
        card_id: &CardId,
        from: &ColumnId,
        to: &ColumnId,
        at: Option<usize>,
    ) -> Result<CommandOutput<MoveOutcome>> {
        self.apply("move card", |board| board.move_card(card_id, from, to, at))
    }

    /// Dispatches a unified pointer event to the matching entry point
    pub fn handle(&mut self, event: PointerEvent) -> PointerOutcome {
        match event.kind {
            PointerKind::Down => match event.target_card {
                Some(card_id) => self.on_pointer_down(&card_id, event.point),
                None => PointerOutcome::Ignored,
            },
            PointerKind::Move => self.on_pointer_move(event.point),
            PointerKind::Up => self.on_pointer_up(),
            PointerKind::Cancel => self.on_pointer_cancel(),
        }
    }

    /// Starts dragging a card from its grip. Ignored while another drag runs.
    pub fn on_pointer_down(&mut self, card_id: &CardId, point: Point) -> PointerOutcome {
        let Some(origin) = self.board.column_of(card_id) else {
            if self.drag.is_dragging() {
                return PointerOutcome::Ignored;
            }
            tracing::warn!("Pointer down on unknown card {}", card_id);
            return PointerOutcome::Rejected(LeadboardError::CardNotFound(*card_id));
        };

        if !self.drag.begin(*card_id, origin, point) {
            tracing::debug!("Pointer down on card {} ignored, drag in progress", card_id);
            return PointerOutcome::Ignored;
        }
        tracing::debug!("Drag started for card {} from column {}", card_id, origin);
        PointerOutcome::DragStarted {
            card_id: *card_id,
            origin,
        }
    }

    pub fn on_pointer_move(&mut self, point: Point) -> PointerOutcome {
        if !self.drag.is_dragging() {
            return PointerOutcome::Ignored;
        }

        // regions can outlive their column, e.g. across a reload
        let hovered = self
            .regions
            .resolve(point)
            .filter(|column_id| self.board.column(column_id).is_some());
        match self.drag.track(point, hovered) {
            Some(session) => PointerOutcome::Tracking {
                target: session.hovered,
            },
            None => PointerOutcome::Ignored,
        }
    }

    /// Ends the drag, moving the card when released over another column
    pub fn on_pointer_up(&mut self) -> PointerOutcome {
        let Some((session, resolution)) = self.drag.release() else {
            return PointerOutcome::Ignored;
        };

        match resolution {
            DragResolution::Move { card_id, from, to } => {
                match self.apply("drop card", |board| board.move_card(&card_id, &from, &to, None)) {
                    Ok(output) => {
                        tracing::debug!("Card {} dropped from {} into {}", card_id, from, to);
                        PointerOutcome::Committed {
                            card_id,
                            from,
                            to,
                            board: output.board,
                        }
                    }
                    Err(err) => PointerOutcome::Rejected(err),
                }
            }
            DragResolution::NoTarget => {
                tracing::debug!("Card {} released outside any column", session.card_id);
                PointerOutcome::NoOp(NoOpReason::NoTarget)
            }
            DragResolution::SameColumn => {
                tracing::debug!("Card {} released on its own column", session.card_id);
                PointerOutcome::NoOp(NoOpReason::SameColumn)
            }
        }
    }

    /// Abandons the drag without touching the board
    pub fn on_pointer_cancel(&mut self) -> PointerOutcome {
        match self.drag.cancel() {
            Some(session) => {
                tracing::debug!("Drag of card {} cancelled", session.card_id);
                PointerOutcome::NoOp(NoOpReason::Cancelled)
            }
            None => PointerOutcome::Ignored,
        }
    }

    fn apply<T>(
        &mut self,
        action: &str,
        op: impl FnOnce(&mut Board) -> Result<T>,
    ) -> Result<CommandOutput<T>> {
        let mut next = Board::clone(&self.board);
        let value = match op(&mut next) {
            Ok(value) => value,
            Err(err) => {
                if err.is_rejection() {
                    tracing::warn!("Rejected {}: {}", action, err);
                } else {
                    tracing::error!("Failed to {}: {}", action, err);
                }
                return Err(err);
            }
        };

        if next != *self.board {
            tracing::info!("Committed {}", action);
            self.publish(Arc::new(next));
        }

        Ok(CommandOutput {
            value,
            board: self.board(),
        })
    }

    fn publish(&mut self, board: Arc<Board>) {
        self.board = board;
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&self.board);
        }
        self.snapshots.send_replace(Arc::clone(&self.board));
    }
}
