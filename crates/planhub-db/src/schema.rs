//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (global scope, identity only)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD avatar_url ON TABLE user TYPE option<string>;
DEFINE FIELD email_verified ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Organizations (global scope)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD description ON TABLE organization TYPE option<string>;
DEFINE FIELD logo_url ON TABLE organization TYPE option<string>;
DEFINE FIELD is_active ON TABLE organization TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Organization members (the access gate)
-- =======================================================================
DEFINE TABLE organization_member SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE organization_member TYPE string;
DEFINE FIELD user_id ON TABLE organization_member TYPE string;
DEFINE FIELD role ON TABLE organization_member TYPE string \
    ASSERT $value IN ['Owner', 'Admin', 'Member', 'Viewer'];
DEFINE FIELD joined_at ON TABLE organization_member TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD invited_by ON TABLE organization_member \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE organization_member TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization_member TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_member_org_user ON TABLE organization_member \
    COLUMNS organization_id, user_id UNIQUE;
DEFINE INDEX idx_member_user ON TABLE organization_member \
    COLUMNS user_id;

-- =======================================================================
-- Projects (organization scope)
-- =======================================================================
DEFINE TABLE project SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE project TYPE string;
DEFINE FIELD name ON TABLE project TYPE string;
DEFINE FIELD description ON TABLE project TYPE option<string>;
DEFINE FIELD color_theme ON TABLE project TYPE option<string>;
DEFINE FIELD created_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_project_org ON TABLE project \
    COLUMNS organization_id;

-- =======================================================================
-- Boards (project scope)
-- =======================================================================
DEFINE TABLE board SCHEMAFULL;
DEFINE FIELD project_id ON TABLE board TYPE string;
DEFINE FIELD name ON TABLE board TYPE string;
DEFINE FIELD description ON TABLE board TYPE option<string>;
DEFINE FIELD view_type ON TABLE board TYPE string \
    ASSERT $value IN ['Kanban', 'List', 'Calendar'];
DEFINE FIELD is_active ON TABLE board TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE board TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE board TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_board_project ON TABLE board COLUMNS project_id;

-- =======================================================================
-- Task statuses (board columns)
-- =======================================================================
DEFINE TABLE task_status SCHEMAFULL;
DEFINE FIELD board_id ON TABLE task_status TYPE string;
DEFINE FIELD name ON TABLE task_status TYPE string;
DEFINE FIELD color ON TABLE task_status TYPE string;
DEFINE FIELD order_index ON TABLE task_status TYPE int;
DEFINE FIELD is_final ON TABLE task_status TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE task_status TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE task_status TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_status_board_name ON TABLE task_status \
    COLUMNS board_id, name UNIQUE;
DEFINE INDEX idx_status_board_order ON TABLE task_status \
    COLUMNS board_id, order_index UNIQUE;

-- =======================================================================
-- Tasks (board scope)
-- =======================================================================
DEFINE TABLE task SCHEMAFULL;
DEFINE FIELD board_id ON TABLE task TYPE string;
DEFINE FIELD status_id ON TABLE task TYPE string;
DEFINE FIELD title ON TABLE task TYPE string;
DEFINE FIELD description ON TABLE task TYPE option<string>;
DEFINE FIELD priority ON TABLE task TYPE string \
    ASSERT $value IN ['Low', 'Medium', 'High', 'Critical'];
DEFINE FIELD due_date ON TABLE task TYPE option<datetime>;
DEFINE FIELD order_index ON TABLE task TYPE int DEFAULT 0;
DEFINE FIELD is_completed ON TABLE task TYPE bool DEFAULT false;
DEFINE FIELD completed_at ON TABLE task TYPE option<datetime>;
DEFINE FIELD creator_id ON TABLE task TYPE string;
DEFINE FIELD assignee_id ON TABLE task TYPE option<string>;
DEFINE FIELD created_at ON TABLE task TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE task TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_task_board ON TABLE task COLUMNS board_id;
DEFINE INDEX idx_task_status ON TABLE task COLUMNS status_id;

-- =======================================================================
-- Checklists (task scope)
-- =======================================================================
DEFINE TABLE checklist SCHEMAFULL;
DEFINE FIELD task_id ON TABLE checklist TYPE string;
DEFINE FIELD title ON TABLE checklist TYPE string;
DEFINE FIELD is_completed ON TABLE checklist TYPE bool DEFAULT false;
DEFINE FIELD completed_at ON TABLE checklist TYPE option<datetime>;
DEFINE FIELD order_index ON TABLE checklist TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE checklist TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE checklist TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_checklist_task ON TABLE checklist COLUMNS task_id;

-- =======================================================================
-- Task comments (task scope)
-- =======================================================================
DEFINE TABLE task_comment SCHEMAFULL;
DEFINE FIELD task_id ON TABLE task_comment TYPE string;
DEFINE FIELD author_id ON TABLE task_comment TYPE string;
DEFINE FIELD content ON TABLE task_comment TYPE string;
DEFINE FIELD is_edited ON TABLE task_comment TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE task_comment TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE task_comment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_comment_task ON TABLE task_comment COLUMNS task_id;

-- =======================================================================
-- Tags (project scope)
-- =======================================================================
DEFINE TABLE tag SCHEMAFULL;
DEFINE FIELD project_id ON TABLE tag TYPE string;
DEFINE FIELD name ON TABLE tag TYPE string;
DEFINE FIELD color ON TABLE tag TYPE string;
DEFINE FIELD created_at ON TABLE tag TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tag TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tag_project_name ON TABLE tag \
    COLUMNS project_id, name UNIQUE;

-- =======================================================================
-- Graph Edge Tables (relations)
-- =======================================================================

-- Task -> Tag labeling
DEFINE TABLE tagged TYPE RELATION SCHEMAFULL;
DEFINE INDEX idx_tagged_unique ON TABLE tagged COLUMNS in, out UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn board_scoped_uniqueness_is_defined() {
        // Both board-scoped unique indexes back the status engine's
        // collision surfacing.
        assert!(SCHEMA_V1.contains("idx_status_board_name"));
        assert!(SCHEMA_V1.contains("idx_status_board_order"));
    }
}
