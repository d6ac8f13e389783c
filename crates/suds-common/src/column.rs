use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// One pipeline stage of the board.
///
/// The set is closed: anything the backend sends outside these four
/// identifiers is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnId {
    Todo,
    InProgress,
    Done,
    Delivery,
}

impl ColumnId {
    /// Board order, left to right.
    pub const ALL: [ColumnId; 4] = [
        ColumnId::Todo,
        ColumnId::InProgress,
        ColumnId::Done,
        ColumnId::Delivery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Delivery => "delivery",
        }
    }

    /// Title shown on the column header.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Todo => "To Wash",
            Self::InProgress => "Washing",
            Self::Done => "Ready",
            Self::Delivery => "Delivery",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::Done => 2,
            Self::Delivery => 3,
        }
    }
}

impl std::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "delivery" => Ok(Self::Delivery),
            _ => Err(format!("Invalid column: {}", s)),
        }
    }
}

/// A column of the board with its ordered tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub tasks: Vec<Task>,
}

impl Column {
    pub fn empty(id: ColumnId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            tasks: Vec::new(),
        }
    }
}

/// Full board snapshot as returned by `GET /api/kanban`.
///
/// Missing keys deserialize as empty columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KanbanData {
    #[serde(default)]
    pub todo: Vec<Task>,
    #[serde(default, rename = "in-progress")]
    pub in_progress: Vec<Task>,
    #[serde(default)]
    pub done: Vec<Task>,
    #[serde(default)]
    pub delivery: Vec<Task>,
}

impl KanbanData {
    pub fn column(&self, id: ColumnId) -> &[Task] {
        match id {
            ColumnId::Todo => &self.todo,
            ColumnId::InProgress => &self.in_progress,
            ColumnId::Done => &self.done,
            ColumnId::Delivery => &self.delivery,
        }
    }

    pub fn column_mut(&mut self, id: ColumnId) -> &mut Vec<Task> {
        match id {
            ColumnId::Todo => &mut self.todo,
            ColumnId::InProgress => &mut self.in_progress,
            ColumnId::Done => &mut self.done,
            ColumnId::Delivery => &mut self.delivery,
        }
    }

    /// Consume the snapshot into `(column, tasks)` pairs in board order.
    pub fn into_columns(self) -> [(ColumnId, Vec<Task>); 4] {
        [
            (ColumnId::Todo, self.todo),
            (ColumnId::InProgress, self.in_progress),
            (ColumnId::Done, self.done),
            (ColumnId::Delivery, self.delivery),
        ]
    }

    pub fn task_count(&self) -> usize {
        ColumnId::ALL.iter().map(|c| self.column(*c).len()).sum()
    }
}
