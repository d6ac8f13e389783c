//! Board state and the pure logic around it.
//!
//! Nothing in here does I/O. The session drives these pieces against the
//! backend.

pub mod drag;
pub mod filter;
pub mod live;
pub mod store;
pub mod summary;
pub mod transition;

pub use drag::{DragController, DropTarget, MoveIntent, resolve_target};
pub use filter::{ColumnView, FilterCriteria, PaymentFilter, PriorityFilter, project};
pub use live::{LiveOutcome, TASK_MOVED, TaskMovedEvent};
pub use store::{InvariantViolation, TaskStore};
pub use summary::PriceSummary;
pub use transition::{CommitSource, MoveState, MoveTransition, RefreshGate, RefreshTicket};
