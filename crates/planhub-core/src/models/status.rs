//! Task status (board column) domain model.
//!
//! Statuses are the columns of a board, ordered by `order_index`. At most
//! one status per board carries `is_final = true`; occupancy of that
//! status is what defines a task as completed. The status engine in
//! `planhub-engine` maintains that invariant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub id: Uuid,
    pub board_id: Uuid,
    /// Unique within the board (persistence-layer index).
    pub name: String,
    pub color: String,
    /// 0-based ordering key, unique within the board but not required to
    /// be contiguous.
    pub order_index: i64,
    /// True when tasks placed in this status count as completed.
    pub is_final: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskStatus {
    pub const DEFAULT_COLOR: &'static str = "#6B7280";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskStatus {
    pub board_id: Uuid,
    pub name: String,
    /// Defaults to [`TaskStatus::DEFAULT_COLOR`].
    pub color: Option<String>,
    pub order_index: i64,
    /// Defaults to false.
    pub is_final: Option<bool>,
}

/// PATCH semantics: unset fields are no-ops, never resets.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTaskStatus {
    pub name: Option<String>,
    pub color: Option<String>,
    pub order_index: Option<i64>,
    pub is_final: Option<bool>,
}

/// One entry of a bulk status reorder request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusOrder {
    pub status_id: Uuid,
    pub order_index: i64,
}
