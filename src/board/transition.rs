//! Optimistic column moves with reconcile-by-reload.
//!
//! A move runs through an explicit state machine:
//!
//! ```text
//! begin ──▶ Pending ──persist ok──▶ Committed(Optimistic)
//!              │
//!              └──persist err──▶ Reconciling ──reload ok──▶ Committed(Server)
//!                                     │
//!                                     └──reload err─▶ ReloadFailed
//! ```
//!
//! `begin` mutates the store before any network call. A failed persist is
//! not surfaced to the operator; the board is resynchronised from a full
//! snapshot instead. Nothing is retried beyond that one reload.
//!
//! Reloads are ordered by [`RefreshGate`]: each fetch takes a ticket, and a
//! snapshot whose ticket is older than the last applied one is discarded,
//! so an earlier refresh that resolves late cannot overwrite a newer one.

use suds_common::{ColumnId, KanbanData, Task, TaskId};
use tracing::{info, warn};

use super::drag::MoveIntent;
use super::store::TaskStore;
use crate::errors::ApiError;

/// Which state the board holds once a move is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitSource {
    /// Server accepted the move; the optimistic board stands.
    Optimistic,
    /// Server rejected the move; the board was replaced by a fresh snapshot.
    Server,
    /// Server rejected the move and the reload was superseded by a newer
    /// refresh that had already been applied.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveState {
    Pending,
    Reconciling { reason: String },
    Committed(CommitSource),
    /// The move and the reload both failed. The board keeps the optimistic
    /// state until the next refresh or push.
    ReloadFailed { reason: String },
}

impl MoveState {
    pub fn is_final(&self) -> bool {
        matches!(self, MoveState::Committed(_) | MoveState::ReloadFailed { .. })
    }
}

/// Generation ticket for one full-board fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Orders full-board snapshots so the newest issued fetch wins.
#[derive(Debug, Default)]
pub struct RefreshGate {
    issued: u64,
    applied: u64,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Record a resolved fetch. Returns `false` when a newer one was
    /// already applied and this snapshot must be dropped.
    pub fn accept(&mut self, ticket: RefreshTicket) -> bool {
        if ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        true
    }

    /// Apply a snapshot through the gate. Returns whether it was applied.
    pub fn apply(&mut self, store: &mut TaskStore, ticket: RefreshTicket, snapshot: KanbanData) -> bool {
        if !self.accept(ticket) {
            info!(ticket = ticket.0, applied = self.applied, "Discarding stale board snapshot");
            return false;
        }
        store.replace(snapshot);
        true
    }
}

/// One in-flight move.
#[derive(Debug)]
pub struct MoveTransition {
    intent: MoveIntent,
    state: MoveState,
}

impl MoveTransition {
    /// Apply the optimistic half of a move.
    ///
    /// Returns `None`, leaving the store untouched, when the task is no
    /// longer on the board or already sits in `target`.
    pub fn begin(store: &mut TaskStore, task_id: &TaskId, target: ColumnId) -> Option<Self> {
        let from = store.column_of(task_id)?;
        if from == target {
            return None;
        }
        store.move_task(task_id, target);
        info!(task_id = %task_id, from = %from, to = %target, "Optimistic move applied");

        Some(Self {
            intent: MoveIntent {
                task_id: task_id.clone(),
                from,
                to: target,
            },
            state: MoveState::Pending,
        })
    }

    /// Start from a drag-produced intent; source is re-read from the store.
    pub fn from_intent(store: &mut TaskStore, intent: &MoveIntent) -> Option<Self> {
        Self::begin(store, &intent.task_id, intent.to)
    }

    pub fn intent(&self) -> &MoveIntent {
        &self.intent
    }

    pub fn state(&self) -> &MoveState {
        &self.state
    }

    pub fn into_state(self) -> MoveState {
        self.state
    }

    pub fn needs_reload(&self) -> bool {
        matches!(self.state, MoveState::Reconciling { .. })
    }

    /// Feed the persistence result. Only meaningful while `Pending`.
    pub fn on_persisted(&mut self, result: Result<Task, ApiError>) -> &MoveState {
        if self.state != MoveState::Pending {
            return &self.state;
        }
        self.state = match result {
            Ok(_) => {
                info!(task_id = %self.intent.task_id, to = %self.intent.to, "Move persisted");
                MoveState::Committed(CommitSource::Optimistic)
            }
            Err(e) => {
                warn!(
                    task_id = %self.intent.task_id,
                    to = %self.intent.to,
                    error = %e,
                    "Move rejected, reloading board"
                );
                MoveState::Reconciling {
                    reason: e.to_string(),
                }
            }
        };
        &self.state
    }

    /// Feed the reload result. Only meaningful while `Reconciling`.
    pub fn on_reloaded(
        &mut self,
        store: &mut TaskStore,
        gate: &mut RefreshGate,
        ticket: RefreshTicket,
        result: Result<KanbanData, ApiError>,
    ) -> &MoveState {
        if !self.needs_reload() {
            return &self.state;
        }
        self.state = match result {
            Ok(snapshot) => {
                if gate.apply(store, ticket, snapshot) {
                    MoveState::Committed(CommitSource::Server)
                } else {
                    MoveState::Committed(CommitSource::Superseded)
                }
            }
            Err(e) => {
                warn!(task_id = %self.intent.task_id, error = %e, "Reload after failed move also failed");
                MoveState::ReloadFailed {
                    reason: e.to_string(),
                }
            }
        };
        &self.state
    }
}
