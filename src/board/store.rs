//! In-memory board for one operator session.
//!
//! The store holds the four pipeline columns and is the only place task
//! membership changes. Every mutation keeps two invariants:
//!
//! 1. each task id appears in exactly one column;
//! 2. a task's `status` equals the id of the column holding it.
//!
//! Operations on ids that are not on the board are logged no-ops; a drag
//! or push referring to a vanished task is not an error.

use std::collections::HashSet;

use suds_common::{Column, ColumnId, KanbanData, Task, TaskId};
use thiserror::Error;
use tracing::{debug, warn};

/// Broken board invariant, reported by [`TaskStore::check_invariants`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("Task {0} appears in more than one column slot")]
    Duplicate(TaskId),

    #[error("Task {id} has status {status} but sits in column {column}")]
    StatusMismatch {
        id: TaskId,
        status: ColumnId,
        column: ColumnId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskStore {
    columns: [Column; 4],
}

impl Default for TaskStore {
    fn default() -> Self {
        Self {
            columns: ColumnId::ALL.map(Column::empty),
        }
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: KanbanData) -> Self {
        let mut store = Self::default();
        store.replace(snapshot);
        store
    }

    /// Discard the current board and rebuild it from a fetched snapshot.
    ///
    /// A task listed under a column other than its `status` takes the
    /// column it was listed under. A repeated id keeps its first
    /// occurrence.
    pub fn replace(&mut self, snapshot: KanbanData) {
        let mut seen = HashSet::new();
        let mut columns = ColumnId::ALL.map(Column::empty);

        for (column_id, tasks) in snapshot.into_columns() {
            let column = &mut columns[column_id.index()];
            for mut task in tasks {
                if !seen.insert(task.id.clone()) {
                    warn!(task_id = %task.id, column = %column_id, "Dropping duplicate task from snapshot");
                    continue;
                }
                if task.status != column_id {
                    debug!(
                        task_id = %task.id,
                        status = %task.status,
                        column = %column_id,
                        "Normalising task status to its snapshot column"
                    );
                    task.status = column_id;
                }
                column.tasks.push(task);
            }
        }

        self.columns = columns;
        debug!(tasks = self.len(), "Board replaced from snapshot");
    }

    /// Move a task to `target`, appending it to the end of that column.
    ///
    /// Returns `false` when the id is not on the board. Moving a task into
    /// the column it already occupies changes nothing, including its
    /// position.
    pub fn move_task(&mut self, task_id: &TaskId, target: ColumnId) -> bool {
        let Some((source, index)) = self.position(task_id) else {
            debug!(task_id = %task_id, target = %target, "Move ignored: task not on board");
            return false;
        };
        if source == target {
            return true;
        }

        let mut task = self.columns[source.index()].tasks.remove(index);
        task.status = target;
        self.columns[target.index()].tasks.push(task);
        true
    }

    /// Insert or replace a task by id.
    ///
    /// Same status: replaced in place. Different status: relocated to the
    /// end of its new column. Unknown id: appended to its status column.
    pub fn upsert_task(&mut self, task: Task) {
        match self.position(&task.id) {
            Some((column, index)) if column == task.status => {
                self.columns[column.index()].tasks[index] = task;
            }
            Some((column, index)) => {
                self.columns[column.index()].tasks.remove(index);
                self.columns[task.status.index()].tasks.push(task);
            }
            None => {
                self.columns[task.status.index()].tasks.push(task);
            }
        }
    }

    /// Remove any copy of the task, then append it to `target` with its
    /// status set to match.
    pub fn relocate(&mut self, mut task: Task, target: ColumnId) {
        self.remove_task(&task.id);
        task.status = target;
        self.columns[target.index()].tasks.push(task);
    }

    /// Delete a task wherever it is. Returns the removed task, if any.
    pub fn remove_task(&mut self, task_id: &TaskId) -> Option<Task> {
        let (column, index) = self.position(task_id)?;
        Some(self.columns[column.index()].tasks.remove(index))
    }

    pub fn column(&self, id: ColumnId) -> &Column {
        &self.columns[id.index()]
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn find(&self, task_id: &TaskId) -> Option<&Task> {
        let (column, index) = self.position(task_id)?;
        self.columns[column.index()].tasks.get(index)
    }

    /// Column currently holding the task.
    pub fn column_of(&self, task_id: &TaskId) -> Option<ColumnId> {
        self.position(task_id).map(|(column, _)| column)
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.position(task_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All tasks in board order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns.iter().flat_map(|c| c.tasks.iter())
    }

    /// Ids of one column, in order.
    pub fn task_ids(&self, column: ColumnId) -> Vec<&TaskId> {
        self.column(column).tasks.iter().map(|t| &t.id).collect()
    }

    /// Inverse of [`TaskStore::replace`].
    pub fn to_snapshot(&self) -> KanbanData {
        let mut data = KanbanData::default();
        for column in &self.columns {
            *data.column_mut(column.id) = column.tasks.clone();
        }
        data
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            for task in &column.tasks {
                if !seen.insert(&task.id) {
                    return Err(InvariantViolation::Duplicate(task.id.clone()));
                }
                if task.status != column.id {
                    return Err(InvariantViolation::StatusMismatch {
                        id: task.id.clone(),
                        status: task.status,
                        column: column.id,
                    });
                }
            }
        }
        Ok(())
    }

    fn position(&self, task_id: &TaskId) -> Option<(ColumnId, usize)> {
        self.columns.iter().find_map(|column| {
            column
                .tasks
                .iter()
                .position(|t| &t.id == task_id)
                .map(|index| (column.id, index))
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use suds_common::{CustomerSnapshot, Priority};

    pub(crate) fn task(id: &str, title: &str, status: ColumnId) -> Task {
        Task::new(
            id,
            title,
            status,
            CustomerSnapshot {
                id: format!("cust-{}", id),
                name: format!("Customer {}", id),
                room_number: None,
            },
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
        )
    }

    pub(crate) fn snapshot(columns: &[(ColumnId, &[&str])]) -> KanbanData {
        let mut data = KanbanData::default();
        for (column, ids) in columns {
            for id in *ids {
                data.column_mut(*column)
                    .push(task(id, &format!("Order {}", id), *column));
            }
        }
        data
    }

    fn ids(store: &TaskStore, column: ColumnId) -> Vec<String> {
        store
            .task_ids(column)
            .into_iter()
            .map(|id| id.to_string())
            .collect()
    }

    #[test]
    fn test_replace_builds_all_columns() {
        let store = TaskStore::from_snapshot(snapshot(&[
            (ColumnId::Todo, &["a", "b"]),
            (ColumnId::Delivery, &["c"]),
        ]));
        assert_eq!(store.len(), 3);
        assert_eq!(ids(&store, ColumnId::Todo), vec!["a", "b"]);
        assert!(store.column(ColumnId::InProgress).tasks.is_empty());
        assert_eq!(store.column(ColumnId::Done).title, "Ready");
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_replace_discards_previous_state() {
        let mut store = TaskStore::from_snapshot(snapshot(&[(ColumnId::Todo, &["a"])]));
        store.replace(snapshot(&[(ColumnId::Done, &["z"])]));
        assert!(!store.contains(&"a".into()));
        assert_eq!(store.column_of(&"z".into()), Some(ColumnId::Done));
    }

    #[test]
    fn test_replace_normalises_status_and_drops_duplicates() {
        let mut data = KanbanData::default();
        data.todo.push(task("a", "Wash", ColumnId::Done));
        data.delivery.push(task("a", "Wash again", ColumnId::Delivery));
        let store = TaskStore::from_snapshot(data);

        assert_eq!(store.len(), 1);
        let a = store.find(&"a".into()).unwrap();
        assert_eq!(a.status, ColumnId::Todo);
        assert_eq!(a.title, "Wash");
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_move_task_relocates_and_sets_status() {
        let mut store = TaskStore::from_snapshot(snapshot(&[
            (ColumnId::Todo, &["a", "b"]),
            (ColumnId::InProgress, &["c"]),
        ]));
        assert!(store.move_task(&"a".into(), ColumnId::InProgress));

        assert_eq!(ids(&store, ColumnId::Todo), vec!["b"]);
        assert_eq!(ids(&store, ColumnId::InProgress), vec!["c", "a"]);
        assert_eq!(store.find(&"a".into()).unwrap().status, ColumnId::InProgress);
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_move_task_same_column_is_unchanged() {
        let mut store = TaskStore::from_snapshot(snapshot(&[(ColumnId::Todo, &["a", "b"])]));
        let before = store.clone();
        assert!(store.move_task(&"a".into(), ColumnId::Todo));
        assert_eq!(store, before);
    }

    #[test]
    fn test_move_task_unknown_id_is_noop() {
        let mut store = TaskStore::from_snapshot(snapshot(&[(ColumnId::Todo, &["a"])]));
        let before = store.clone();
        assert!(!store.move_task(&"ghost".into(), ColumnId::Done));
        assert_eq!(store, before);
    }

    #[test]
    fn test_move_into_empty_column() {
        let mut store = TaskStore::from_snapshot(snapshot(&[(ColumnId::Todo, &["a"])]));
        store.move_task(&"a".into(), ColumnId::Delivery);
        assert_eq!(ids(&store, ColumnId::Delivery), vec!["a"]);
        assert!(store.column(ColumnId::Todo).tasks.is_empty());
    }

    #[test]
    fn test_upsert_replaces_in_place_when_status_unchanged() {
        let mut store = TaskStore::from_snapshot(snapshot(&[(ColumnId::Todo, &["a", "b", "c"])]));
        let mut updated = task("b", "Renamed", ColumnId::Todo);
        updated.priority = Priority::High;
        store.upsert_task(updated);

        assert_eq!(ids(&store, ColumnId::Todo), vec!["a", "b", "c"]);
        let b = store.find(&"b".into()).unwrap();
        assert_eq!(b.title, "Renamed");
        assert_eq!(b.priority, Priority::High);
    }

    #[test]
    fn test_upsert_relocates_when_status_changed() {
        let mut store = TaskStore::from_snapshot(snapshot(&[
            (ColumnId::Todo, &["a", "b"]),
            (ColumnId::Done, &["d"]),
        ]));
        store.upsert_task(task("a", "Order a", ColumnId::Done));

        assert_eq!(ids(&store, ColumnId::Todo), vec!["b"]);
        assert_eq!(ids(&store, ColumnId::Done), vec!["d", "a"]);
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_upsert_appends_new_task() {
        let mut store = TaskStore::new();
        store.upsert_task(task("n", "New", ColumnId::InProgress));
        assert_eq!(ids(&store, ColumnId::InProgress), vec!["n"]);
    }

    #[test]
    fn test_relocate_forces_status() {
        let mut store = TaskStore::from_snapshot(snapshot(&[(ColumnId::Todo, &["a"])]));
        store.relocate(task("a", "Order a", ColumnId::Todo), ColumnId::Delivery);
        assert_eq!(store.column_of(&"a".into()), Some(ColumnId::Delivery));
        assert_eq!(store.len(), 1);
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_task() {
        let mut store = TaskStore::from_snapshot(snapshot(&[(ColumnId::Done, &["a", "b"])]));
        let removed = store.remove_task(&"a".into()).unwrap();
        assert_eq!(removed.id, TaskId::from("a"));
        assert_eq!(ids(&store, ColumnId::Done), vec!["b"]);

        let before = store.clone();
        assert!(store.remove_task(&"a".into()).is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn test_snapshot_roundtrip_preserves_order() {
        let data = snapshot(&[
            (ColumnId::Todo, &["a", "b"]),
            (ColumnId::InProgress, &["c"]),
            (ColumnId::Delivery, &["d"]),
        ]);
        let store = TaskStore::from_snapshot(data.clone());
        assert_eq!(store.to_snapshot(), data);
    }

    #[test]
    fn test_check_invariants_detects_mismatch() {
        let mut store = TaskStore::new();
        store.columns[0].tasks.push(task("a", "x", ColumnId::Done));
        assert_eq!(
            store.check_invariants(),
            Err(InvariantViolation::StatusMismatch {
                id: "a".into(),
                status: ColumnId::Done,
                column: ColumnId::Todo,
            })
        );

        let mut store = TaskStore::new();
        store.columns[0].tasks.push(task("a", "x", ColumnId::Todo));
        store.columns[1].tasks.push(task("a", "x", ColumnId::InProgress));
        assert_eq!(
            store.check_invariants(),
            Err(InvariantViolation::Duplicate("a".into()))
        );
    }

    #[test]
    fn test_invariants_hold_across_mixed_operations() {
        let mut store = TaskStore::from_snapshot(snapshot(&[
            (ColumnId::Todo, &["a", "b", "c"]),
            (ColumnId::Done, &["d"]),
        ]));
        let steps: Vec<Box<dyn Fn(&mut TaskStore)>> = vec![
            Box::new(|s| {
                s.move_task(&"a".into(), ColumnId::Delivery);
            }),
            Box::new(|s| s.upsert_task(task("d", "d", ColumnId::Todo))),
            Box::new(|s| {
                s.remove_task(&"b".into());
            }),
            Box::new(|s| s.relocate(task("e", "e", ColumnId::Todo), ColumnId::InProgress)),
            Box::new(|s| {
                s.move_task(&"ghost".into(), ColumnId::Todo);
            }),
            Box::new(|s| {
                s.move_task(&"c".into(), ColumnId::Todo);
            }),
        ];
        for step in steps {
            step(&mut store);
            store.check_invariants().unwrap();
        }
        assert_eq!(store.len(), 4);
    }
}
