use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::column::ColumnId;

/// Opaque task identifier assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// Denormalized customer fields carried on every task for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSnapshot {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffRef {
    pub id: String,
    pub name: String,
}

/// A laundry order moving through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ColumnId,
    #[serde(default)]
    pub priority: Priority,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub items: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub has_blankets: bool,
    #[serde(default)]
    pub blanket_count: u32,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    pub customer_id: String,
    pub customer: CustomerSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<StaffRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskValidationError {
    #[error("Task title must not be empty")]
    EmptyTitle,

    #[error("Total price must be non-negative, got {0}")]
    NegativePrice(f64),

    #[error("Weight must be non-negative, got {0}")]
    NegativeWeight(f64),

    #[error("Blanket count {0} set without the blanket add-on")]
    BlanketsWithoutFlag(u32),
}

impl Task {
    /// Minimal task with every optional field unset.
    pub fn new(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        status: ColumnId,
        customer: CustomerSnapshot,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status,
            priority: Priority::default(),
            due_date,
            items: 0,
            weight: None,
            has_blankets: false,
            blanket_count: 0,
            is_paid: false,
            total_price: None,
            service_type: None,
            customer_id: customer.id.clone(),
            customer,
            assigned_to_id: None,
            assigned_to: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        check_amounts(self.total_price, self.weight)?;
        if !self.has_blankets && self.blanket_count > 0 {
            return Err(TaskValidationError::BlanketsWithoutFlag(self.blanket_count));
        }
        Ok(())
    }

    /// Blanket add-ons actually billed; zero unless the flag is set.
    pub fn effective_blankets(&self) -> u32 {
        if self.has_blankets { self.blanket_count } else { 0 }
    }
}

fn check_amounts(price: Option<f64>, weight: Option<f64>) -> Result<(), TaskValidationError> {
    if let Some(price) = price
        && (price < 0.0 || price.is_nan())
    {
        return Err(TaskValidationError::NegativePrice(price));
    }
    if let Some(weight) = weight
        && (weight < 0.0 || weight.is_nan())
    {
        return Err(TaskValidationError::NegativeWeight(weight));
    }
    Ok(())
}

/// Create/update payload. Unset fields are omitted from the JSON body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_blankets: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blanket_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<String>,
}

impl TaskDraft {
    /// Client-side checks run before the draft is sent.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if let Some(title) = &self.title
            && title.trim().is_empty()
        {
            return Err(TaskValidationError::EmptyTitle);
        }
        check_amounts(self.total_price, self.weight)?;
        if self.has_blankets == Some(false)
            && let Some(count) = self.blanket_count
            && count > 0
        {
            return Err(TaskValidationError::BlanketsWithoutFlag(count));
        }
        Ok(())
    }
}
