//! Task domain model and the completion-sync primitive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PlanhubError, PlanhubResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub fn parse(s: &str) -> PlanhubResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(PlanhubError::Validation {
                message: format!("Invalid priority: {other}"),
            }),
        }
    }
}

/// A task belongs to exactly one board and sits in exactly one of that
/// board's statuses. `is_completed` and `completed_at` are derived from
/// the holding status's `is_final` flag, never set directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub board_id: Uuid,
    /// Current column. Always a status of `board_id`.
    pub status_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    /// Position within the status column.
    pub order_index: i64,
    /// Derived: equal to the holding status's `is_final`.
    pub is_completed: bool,
    /// Non-null iff `is_completed`; preserved across final-to-final moves.
    pub completed_at: Option<DateTime<Utc>>,
    pub creator_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Re-derives `is_completed`/`completed_at` from the holding status's
    /// final flag. Returns true when either field changed.
    ///
    /// The original completion timestamp is preserved when the task was
    /// already completed; a task that is completed but missing its
    /// timestamp (or vice versa) is repaired.
    pub fn apply_completion(&mut self, status_is_final: bool, now: DateTime<Utc>) -> bool {
        if status_is_final {
            if !self.is_completed {
                self.is_completed = true;
                self.completed_at = Some(now);
                true
            } else if self.completed_at.is_none() {
                self.completed_at = Some(now);
                true
            } else {
                false
            }
        } else if self.is_completed || self.completed_at.is_some() {
            self.is_completed = false;
            self.completed_at = None;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub board_id: Uuid,
    pub status_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Defaults to [`TaskPriority::Medium`].
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    /// Defaults to 0.
    pub order_index: Option<i64>,
    pub creator_id: Uuid,
    pub assignee_id: Option<Uuid>,
}

/// PATCH semantics: unset fields are no-ops. A provided `status_id` that
/// differs from the task's current status is a status transition and
/// triggers completion re-derivation in the engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub order_index: Option<i64>,
    pub status_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task() -> Task {
        Task {
            id: Uuid::new_v4(),
            board_id: Uuid::new_v4(),
            status_id: Uuid::new_v4(),
            title: "t".into(),
            description: None,
            priority: TaskPriority::Medium,
            due_date: None,
            order_index: 0,
            is_completed: false,
            completed_at: None,
            creator_id: Uuid::new_v4(),
            assignee_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn moving_to_final_sets_timestamp() {
        let mut t = task();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert!(t.apply_completion(true, now));
        assert!(t.is_completed);
        assert_eq!(t.completed_at, Some(now));
    }

    #[test]
    fn already_completed_keeps_original_timestamp() {
        let mut t = task();
        let first = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        t.apply_completion(true, first);
        assert!(!t.apply_completion(true, later));
        assert_eq!(t.completed_at, Some(first));
    }

    #[test]
    fn moving_off_final_clears_timestamp() {
        let mut t = task();
        t.apply_completion(true, Utc::now());
        assert!(t.apply_completion(false, Utc::now()));
        assert!(!t.is_completed);
        assert_eq!(t.completed_at, None);
    }

    #[test]
    fn repairs_missing_timestamp() {
        let mut t = task();
        t.is_completed = true; // stale state: completed without timestamp
        let now = Utc::now();
        assert!(t.apply_completion(true, now));
        assert_eq!(t.completed_at, Some(now));
    }

    #[test]
    fn idempotent_when_consistent() {
        let mut t = task();
        assert!(!t.apply_completion(false, Utc::now()));
        t.apply_completion(true, Utc::now());
        assert!(!t.apply_completion(true, Utc::now()));
    }
}
