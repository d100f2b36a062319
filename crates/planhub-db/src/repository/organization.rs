//! SurrealDB implementation of [`OrganizationRepository`].

use chrono::{DateTime, Utc};
use planhub_core::error::PlanhubResult;
use planhub_core::models::organization::{
    CreateOrganization, Organization, UpdateOrganization,
};
use planhub_core::repository::OrganizationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    description: Option<String>,
    logo_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn into_organization(self, id: Uuid) -> Organization {
        Organization {
            id,
            name: self.name,
            description: self.description,
            logo_url: self.logo_url,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> PlanhubResult<Organization> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('organization', $id) SET \
                 name = $name, description = $description",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id))
    }

    async fn get_by_id(&self, id: Uuid) -> PlanhubResult<Organization> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('organization', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id))
    }

    async fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> PlanhubResult<Organization> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.logo_url.is_some() {
            sets.push("logo_url = $logo_url");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('organization', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(logo_url) = input.logo_url {
            builder = builder.bind(("logo_url", logo_url));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id))
    }

    async fn delete(&self, id: Uuid) -> PlanhubResult<()> {
        // One transaction for the full subtree: projects, boards, statuses,
        // tasks, task children, tags, memberships, then the organization.
        self.db
            .query(
                "BEGIN;
                 LET $project_ids = \
                     (SELECT VALUE meta::id(id) FROM project \
                      WHERE organization_id = $org_id);
                 LET $board_ids = \
                     (SELECT VALUE meta::id(id) FROM board \
                      WHERE project_id IN $project_ids);
                 LET $tasks = \
                     (SELECT VALUE id FROM task WHERE board_id IN $board_ids);
                 LET $task_ids = \
                     (SELECT VALUE meta::id(id) FROM task \
                      WHERE board_id IN $board_ids);
                 DELETE checklist WHERE task_id IN $task_ids;
                 DELETE task_comment WHERE task_id IN $task_ids;
                 DELETE tagged WHERE in IN $tasks;
                 DELETE task WHERE board_id IN $board_ids;
                 DELETE task_status WHERE board_id IN $board_ids;
                 DELETE tag WHERE project_id IN $project_ids;
                 DELETE board WHERE project_id IN $project_ids;
                 DELETE project WHERE organization_id = $org_id;
                 DELETE organization_member WHERE organization_id = $org_id;
                 DELETE type::record('organization', $org_id);
                 COMMIT;",
            )
            .bind(("org_id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }
}
