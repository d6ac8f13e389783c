//! Remote "task moved" notifications applied to the local board.
//!
//! A push carries the full task, so every field another operator changed
//! is picked up, not only the column. Pushes are applied unconditionally
//! in arrival order; they are server state and win over any optimistic
//! guess for the same task.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use suds_common::{ColumnId, Task, TaskId};
use tracing::{debug, warn};

use super::store::TaskStore;

/// Push event name for remote column changes.
pub const TASK_MOVED: &str = "task-moved";

/// Payload of a [`TASK_MOVED`] push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMovedEvent {
    pub task_id: TaskId,
    /// Kept as a string so an unknown column can be reported and skipped.
    pub new_status: String,
    pub task: Task,
}

/// Wire form of [`TaskMovedEvent`]. The task stays untyped until its
/// status has been replaced by the validated `newStatus`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTaskMoved {
    task_id: TaskId,
    new_status: String,
    task: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiveOutcome {
    Applied {
        task_id: TaskId,
        from: Option<ColumnId>,
        to: ColumnId,
    },
    UnknownStatus {
        task_id: TaskId,
        status: String,
    },
    Malformed {
        error: String,
    },
}

fn malformed(error: serde_json::Error) -> LiveOutcome {
    warn!(error = %error, "Dropping malformed task-moved push");
    LiveOutcome::Malformed {
        error: error.to_string(),
    }
}

fn unknown_status(task_id: TaskId, status: String) -> LiveOutcome {
    warn!(task_id = %task_id, status = %status, "Dropping push for unknown column");
    LiveOutcome::UnknownStatus { task_id, status }
}

/// Decode and apply a raw push payload.
///
/// `newStatus` is checked before the task is decoded, so a push to a
/// column this client does not know is reported as `UnknownStatus` even
/// when the nested task carries the same status.
pub fn apply_raw(store: &mut TaskStore, raw: &str) -> LiveOutcome {
    let event = match serde_json::from_str::<RawTaskMoved>(raw) {
        Ok(event) => event,
        Err(e) => return malformed(e),
    };
    let Ok(target) = event.new_status.parse::<ColumnId>() else {
        return unknown_status(event.task_id, event.new_status);
    };

    let mut task = event.task;
    if let Some(fields) = task.as_object_mut() {
        fields.insert("status".to_string(), Value::String(target.as_str().to_string()));
    }
    match serde_json::from_value::<Task>(task) {
        Ok(task) => apply_task_moved(
            store,
            TaskMovedEvent {
                task_id: event.task_id,
                new_status: event.new_status,
                task,
            },
        ),
        Err(e) => malformed(e),
    }
}

/// Remove the task named by `task_id` from every column, then append the
/// pushed version to the column named by `new_status`. The payload is
/// stored under `task_id`; no other task is touched.
pub fn apply_task_moved(store: &mut TaskStore, event: TaskMovedEvent) -> LiveOutcome {
    let Ok(target) = event.new_status.parse::<ColumnId>() else {
        return unknown_status(event.task_id, event.new_status);
    };

    let from = store.column_of(&event.task_id);
    let mut task = event.task;
    if task.id != event.task_id {
        debug!(payload_id = %task.id, task_id = %event.task_id, "Push payload id differs, using event id");
        task.id = event.task_id.clone();
    }
    store.relocate(task, target);
    debug!(task_id = %event.task_id, to = %target, "Applied remote move");

    LiveOutcome::Applied {
        task_id: event.task_id,
        from,
        to: target,
    }
}
