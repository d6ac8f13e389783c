//! Shared domain types for the suds laundry board.
//!
//! | Module     | Types                                                   |
//! |------------|---------------------------------------------------------|
//! | `column`   | `ColumnId`, `Column`, `KanbanData` (board wire snapshot) |
//! | `task`     | `Task`, `TaskId`, `Priority`, `TaskDraft`               |
//! | `customer` | `Customer`, `LoyaltyTier`, `LoyaltyAccount`, `Reward`   |

pub mod column;
pub mod customer;
pub mod task;

pub use column::{Column, ColumnId, KanbanData};
pub use customer::{Customer, LoyaltyAccount, LoyaltyTier, RedeemedReward, Reward, RewardKind};
pub use task::{CustomerSnapshot, Priority, StaffRef, Task, TaskDraft, TaskId, TaskValidationError};
