//! Backend collaborators.
//!
//! The session only talks to the shop through these traits, so tests can
//! swap in an in-memory double.

pub mod client;

use std::time::Duration;

use async_trait::async_trait;
use suds_common::{Customer, KanbanData, LoyaltyAccount, Reward, Task, TaskDraft, TaskId};

use crate::errors::ApiError;

pub use client::RestClient;

/// Connection settings shared by the REST client and the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    /// Server root, without the `/api` suffix.
    pub base_url: String,
    pub token: Option<String>,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: None,
        }
    }
}

/// Task and board endpoints.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// `GET /api/kanban`
    async fn fetch_board(&self) -> Result<KanbanData, ApiError>;

    /// `PATCH /api/kanban/move` with `{taskId, newStatus}`.
    async fn move_task(&self, task_id: &TaskId, new_status: &str) -> Result<Task, ApiError>;

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ApiError>;

    async fn update_task(&self, task_id: &TaskId, draft: &TaskDraft) -> Result<Task, ApiError>;

    async fn delete_task(&self, task_id: &TaskId) -> Result<(), ApiError>;
}

/// Customer and loyalty endpoints, used by the lookup commands.
#[async_trait]
pub trait CustomerApi: Send + Sync {
    async fn list_customers(&self) -> Result<Vec<Customer>, ApiError>;

    async fn get_customer(&self, id: &str) -> Result<Customer, ApiError>;

    async fn get_loyalty(&self, customer_id: &str) -> Result<LoyaltyAccount, ApiError>;

    async fn list_rewards(&self) -> Result<Vec<Reward>, ApiError>;

    async fn redeem(&self, customer_id: &str, reward: &Reward) -> Result<LoyaltyAccount, ApiError>;
}
