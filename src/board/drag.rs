//! Drag gestures to move intents.
//!
//! Only one drag is tracked at a time. `drag_end` clears the active drag
//! whatever the outcome.

use suds_common::{ColumnId, TaskId};
use tracing::debug;

use super::store::TaskStore;

/// What the pointer was over when a drag event fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Empty column space (valid even when the column has no tasks).
    Column(ColumnId),
    /// Another task card; resolves to the column holding that task.
    Task(TaskId),
}

impl DropTarget {
    /// Interpret a raw drop-zone id. Column ids win over task ids.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<ColumnId>() {
            Ok(column) => DropTarget::Column(column),
            Err(_) => DropTarget::Task(TaskId::from(raw)),
        }
    }
}

/// Resolve a drop target to the column it designates.
pub fn resolve_target(store: &TaskStore, target: &DropTarget) -> Option<ColumnId> {
    match target {
        DropTarget::Column(column) => Some(*column),
        DropTarget::Task(task_id) => store.column_of(task_id),
    }
}

/// A requested column change, produced by a completed drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveIntent {
    pub task_id: TaskId,
    pub from: ColumnId,
    pub to: ColumnId,
}

#[derive(Debug, Default)]
pub struct DragController {
    active: Option<TaskId>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&TaskId> {
        self.active.as_ref()
    }

    /// Begin dragging a task. Ignored when the task is not on the board.
    pub fn drag_start(&mut self, store: &TaskStore, task_id: TaskId) -> bool {
        if !store.contains(&task_id) {
            debug!(task_id = %task_id, "Drag start ignored: task not on board");
            self.active = None;
            return false;
        }
        self.active = Some(task_id);
        true
    }

    /// Column the active drag would land in, for hover highlighting.
    /// `None` when hovering over the source column or nothing resolvable.
    pub fn drag_over(&self, store: &TaskStore, target: Option<&DropTarget>) -> Option<ColumnId> {
        let active = self.active.as_ref()?;
        let source = store.column_of(active)?;
        let hovered = resolve_target(store, target?)?;
        (hovered != source).then_some(hovered)
    }

    /// Finish the drag. Returns an intent only for a real column change.
    pub fn drag_end(&mut self, store: &TaskStore, target: Option<DropTarget>) -> Option<MoveIntent> {
        let active = self.active.take()?;
        let target = target?;

        if target == DropTarget::Task(active.clone()) {
            return None;
        }

        let from = store.column_of(&active)?;
        let to = resolve_target(store, &target)?;
        if from == to {
            return None;
        }

        Some(MoveIntent {
            task_id: active,
            from,
            to,
        })
    }

    /// Abandon the drag without a drop (e.g. the pointer left the window).
    pub fn cancel(&mut self) {
        self.active = None;
    }
}
