//! Tag domain model.
//!
//! Tags are project-scoped labels, unique by name within a project, and
//! many-to-many with tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub project_id: Uuid,
    /// Unique within the project.
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    pub const DEFAULT_COLOR: &'static str = "#3B82F6";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTag {
    pub project_id: Uuid,
    pub name: String,
    /// Defaults to [`Tag::DEFAULT_COLOR`].
    pub color: Option<String>,
}
