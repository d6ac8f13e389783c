//! Read-only filtered projection of the board.

use std::str::FromStr;

use suds_common::{ColumnId, Priority, Task};

use super::store::TaskStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub fn matches(&self, priority: Priority) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == priority,
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            other => other
                .parse::<Priority>()
                .map(Self::Only)
                .map_err(|_| format!("Invalid priority filter: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentFilter {
    #[default]
    All,
    Paid,
    Unpaid,
}

impl PaymentFilter {
    pub fn matches(&self, is_paid: bool) -> bool {
        match self {
            Self::All => true,
            Self::Paid => is_paid,
            Self::Unpaid => !is_paid,
        }
    }
}

impl FromStr for PaymentFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "paid" => Ok(Self::Paid),
            "unpaid" => Ok(Self::Unpaid),
            _ => Err(format!("Invalid payment filter: {}", s)),
        }
    }
}

/// Current search text and filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    pub priority: PriorityFilter,
    pub payment: PaymentFilter,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.priority == PriorityFilter::All
            && self.payment == PaymentFilter::All
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.matches_search(task) && self.priority.matches(task.priority) && self.payment.matches(task.is_paid)
    }

    fn matches_search(&self, task: &Task) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        task.title.to_lowercase().contains(&needle)
            || task.customer.name.to_lowercase().contains(&needle)
            || task
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

/// One column after filtering. Borrows from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView<'a> {
    pub id: ColumnId,
    pub title: &'static str,
    pub tasks: Vec<&'a Task>,
}

/// Project the board through `criteria`. Every column is present, in board
/// order, even when nothing in it matches.
pub fn project<'a>(store: &'a TaskStore, criteria: &FilterCriteria) -> Vec<ColumnView<'a>> {
    store
        .columns()
        .iter()
        .map(|column| ColumnView {
            id: column.id,
            title: column.id.title(),
            tasks: column.tasks.iter().filter(|t| criteria.matches(t)).collect(),
        })
        .collect()
}
