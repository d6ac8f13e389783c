//! One operator's board session.
//!
//! `BoardSession` is the single owner of the [`TaskStore`]. Every mutation
//! (drag drops, form submits, live pushes, reloads) goes through `&mut self`,
//! so they are applied one at a time in the order the caller feeds them.

use std::future::Future;
use std::sync::Arc;

use suds_common::{ColumnId, KanbanData, Task, TaskDraft, TaskId};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::api::BoardApi;
use crate::board::{
    ColumnView, DragController, DropTarget, FilterCriteria, LiveOutcome, MoveState, MoveTransition,
    PriceSummary, RefreshGate, RefreshTicket, TaskStore, live, project,
};
use crate::errors::{ApiError, BoardError};

pub struct BoardSession<A: BoardApi + ?Sized> {
    api: Arc<A>,
    store: TaskStore,
    drag: DragController,
    gate: RefreshGate,
}

impl<A: BoardApi + ?Sized> BoardSession<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            store: TaskStore::new(),
            drag: DragController::new(),
            gate: RefreshGate::new(),
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Initial fetch. Unlike a reconcile reload, a failure here is the
    /// caller's problem.
    pub async fn load(&mut self) -> Result<(), BoardError> {
        self.refresh().await?;
        info!(tasks = self.store.len(), "Board loaded");
        Ok(())
    }

    /// Fetch and apply a full snapshot. Returns `false` when a newer
    /// snapshot was applied while this one was in flight.
    pub async fn refresh(&mut self) -> Result<bool, BoardError> {
        let ticket = self.begin_refresh();
        let result = self.api.fetch_board().await;
        Ok(self.finish_refresh(ticket, result)?)
    }

    /// First half of [`refresh`](Self::refresh): take a generation ticket.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.gate.issue()
    }

    /// Second half of [`refresh`](Self::refresh): apply a fetched snapshot
    /// unless a newer one already landed.
    pub fn finish_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<KanbanData, ApiError>,
    ) -> Result<bool, ApiError> {
        let snapshot = result?;
        Ok(self.gate.apply(&mut self.store, ticket, snapshot))
    }

    // ── Drag and drop ────────────────────────────────────────────────

    pub fn drag_start(&mut self, task_id: impl Into<TaskId>) -> bool {
        self.drag.drag_start(&self.store, task_id.into())
    }

    /// Column to highlight while hovering. Never mutates the board.
    pub fn drag_over(&self, target: Option<&DropTarget>) -> Option<ColumnId> {
        self.drag.drag_over(&self.store, target)
    }

    /// End the active drag and apply the optimistic move, if any.
    ///
    /// The returned transition must be passed to [`settle`](Self::settle)
    /// to persist it.
    pub fn drop_task(&mut self, target: Option<DropTarget>) -> Option<MoveTransition> {
        let intent = self.drag.drag_end(&self.store, target)?;
        MoveTransition::from_intent(&mut self.store, &intent)
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    // ── Moves ────────────────────────────────────────────────────────

    /// Persist a move and reconcile on failure. Never returns an error:
    /// a rejected move ends in a reload, a failed reload in
    /// [`MoveState::ReloadFailed`].
    pub async fn settle(&mut self, transition: MoveTransition) -> MoveState {
        let intent = transition.intent().clone();
        let persisted = self
            .api
            .move_task(&intent.task_id, intent.to.as_str())
            .await;
        self.complete(transition, persisted).await
    }

    /// Finish a move whose persistence result is already known.
    pub async fn complete(
        &mut self,
        mut transition: MoveTransition,
        persisted: Result<Task, ApiError>,
    ) -> MoveState {
        transition.on_persisted(persisted);
        if transition.needs_reload() {
            let ticket = self.gate.issue();
            let result = self.api.fetch_board().await;
            transition.on_reloaded(&mut self.store, &mut self.gate, ticket, result);
        }
        debug!(task_id = %transition.intent().task_id, state = ?transition.state(), "Move settled");
        transition.into_state()
    }

    /// Move without a drag gesture. `None` when there was nothing to move
    /// (unknown id or already in `target`).
    pub async fn move_to(&mut self, task_id: &TaskId, target: ColumnId) -> Option<MoveState> {
        let transition = MoveTransition::begin(&mut self.store, task_id, target)?;
        Some(self.settle(transition).await)
    }

    /// [`move_to`](Self::move_to) for operator-typed input.
    pub async fn move_named(&mut self, task_id: &TaskId, column: &str) -> Result<Option<MoveState>, BoardError> {
        let target: ColumnId = column
            .parse()
            .map_err(|_| BoardError::UnknownColumn(column.to_string()))?;
        if !self.store.contains(task_id) {
            return Err(BoardError::TaskNotFound { id: task_id.clone() });
        }
        Ok(self.move_to(task_id, target).await)
    }

    // ── Task forms ───────────────────────────────────────────────────
    //
    // Failures here are returned to the operator and never retried.

    pub async fn create_task(&mut self, draft: &TaskDraft) -> Result<Task, BoardError> {
        draft.validate()?;
        let task = self.api.create_task(draft).await?;
        info!(task_id = %task.id, column = %task.status, "Task created");
        self.store.upsert_task(task.clone());
        Ok(task)
    }

    pub async fn update_task(&mut self, task_id: &TaskId, draft: &TaskDraft) -> Result<Task, BoardError> {
        draft.validate()?;
        let task = self.api.update_task(task_id, draft).await?;
        info!(task_id = %task.id, column = %task.status, "Task updated");
        self.store.upsert_task(task.clone());
        Ok(task)
    }

    pub async fn delete_task(&mut self, task_id: &TaskId) -> Result<(), BoardError> {
        self.api.delete_task(task_id).await?;
        info!(task_id = %task_id, "Task deleted");
        self.store.remove_task(task_id);
        Ok(())
    }

    // ── Live updates ─────────────────────────────────────────────────

    /// Apply one raw `task-moved` payload.
    pub fn apply_push(&mut self, raw: &str) -> LiveOutcome {
        live::apply_raw(&mut self.store, raw)
    }

    /// Apply pushes until `shutdown` resolves or the channel closes.
    ///
    /// `on_event` sees each outcome together with the updated board. A
    /// lagging receiver has lost pushes, so the board is reloaded.
    pub async fn run<S, F>(&mut self, mut pushes: broadcast::Receiver<String>, shutdown: S, mut on_event: F) -> usize
    where
        S: Future<Output = ()>,
        F: FnMut(&LiveOutcome, &TaskStore),
    {
        tokio::pin!(shutdown);
        let mut applied = 0;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("Session loop shutting down");
                    break;
                }
                received = pushes.recv() => match received {
                    Ok(raw) => {
                        let outcome = self.apply_push(&raw);
                        if matches!(outcome, LiveOutcome::Applied { .. }) {
                            applied += 1;
                        }
                        on_event(&outcome, &self.store);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Push receiver lagged, reloading board");
                        if let Err(e) = self.refresh().await {
                            warn!(error = %e, "Reload after lagged pushes failed");
                        }
                    }
                    Err(RecvError::Closed) => {
                        info!("Push channel closed");
                        break;
                    }
                }
            }
        }
        applied
    }

    // ── Derived views ────────────────────────────────────────────────

    pub fn view(&self, criteria: &FilterCriteria) -> Vec<ColumnView<'_>> {
        project(&self.store, criteria)
    }

    pub fn summary(&self) -> PriceSummary {
        PriceSummary::from_tasks(self.store.tasks())
    }
}
