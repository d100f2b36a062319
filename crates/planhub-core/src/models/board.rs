//! Board domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PlanhubError, PlanhubResult};

/// How a board is rendered by clients. Purely presentational; the status
/// and task semantics are identical across view types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardViewType {
    Kanban,
    List,
    Calendar,
}

impl BoardViewType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kanban => "Kanban",
            Self::List => "List",
            Self::Calendar => "Calendar",
        }
    }

    pub fn parse(s: &str) -> PlanhubResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "kanban" => Ok(Self::Kanban),
            "list" => Ok(Self::List),
            "calendar" => Ok(Self::Calendar),
            other => Err(PlanhubError::Validation {
                message: format!("Invalid view type: {other}"),
            }),
        }
    }
}

/// A board belongs to exactly one project and owns an ordered list of
/// task statuses plus the tasks placed in them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub view_type: BoardViewType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoard {
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Defaults to [`BoardViewType::Kanban`].
    pub view_type: Option<BoardViewType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateBoard {
    pub name: Option<String>,
    pub description: Option<String>,
    pub view_type: Option<BoardViewType>,
}
