//! Organization domain model.
//!
//! Organizations are the top-level entity in Planhub's multi-tenancy
//! hierarchy. They own members and projects; everything below a project
//! (boards, statuses, tasks) resolves its access through the owning
//! organization's membership records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organization groups projects under a single administrative entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    /// Soft scope: inactive organizations are retained but hidden.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub description: Option<String>,
}

/// Fields that can be updated on an existing organization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateOrganization {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}
