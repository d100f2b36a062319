//! SurrealDB implementation of [`ProjectRepository`].

use chrono::{DateTime, Utc};
use planhub_core::error::PlanhubResult;
use planhub_core::models::project::{CreateProject, Project, UpdateProject};
use planhub_core::repository::ProjectRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ProjectRow {
    organization_id: String,
    name: String,
    description: Option<String>,
    color_theme: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ProjectRowWithId {
    record_id: String,
    organization_id: String,
    name: String,
    description: Option<String>,
    color_theme: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn try_into_project(self, id: Uuid) -> Result<Project, DbError> {
        Ok(Project {
            id,
            organization_id: Uuid::parse_str(&self.organization_id)
                .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?,
            name: self.name,
            description: self.description,
            color_theme: self.color_theme,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ProjectRowWithId {
    fn try_into_project(self) -> Result<Project, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        ProjectRow {
            organization_id: self.organization_id,
            name: self.name,
            description: self.description,
            color_theme: self.color_theme,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_project(id)
    }
}

/// SurrealDB implementation of the Project repository.
#[derive(Clone)]
pub struct SurrealProjectRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProjectRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProjectRepository for SurrealProjectRepository<C> {
    async fn create(&self, input: CreateProject) -> PlanhubResult<Project> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('project', $id) SET \
                 organization_id = $organization_id, name = $name, \
                 description = $description, color_theme = $color_theme",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("color_theme", input.color_theme))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "project".into(),
            id: id_str,
        })?;

        Ok(row.try_into_project(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PlanhubResult<Project> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('project', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "project".into(),
            id: id_str,
        })?;

        Ok(row.try_into_project(id)?)
    }

    async fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> PlanhubResult<Vec<Project>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM project \
                 WHERE organization_id = $organization_id ORDER BY created_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRowWithId> = result.take(0).map_err(DbError::from)?;
        let projects = rows
            .into_iter()
            .map(ProjectRowWithId::try_into_project)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    async fn update(&self, id: Uuid, input: UpdateProject) -> PlanhubResult<Project> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.color_theme.is_some() {
            sets.push("color_theme = $color_theme");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('project', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(color_theme) = input.color_theme {
            builder = builder.bind(("color_theme", color_theme));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "project".into(),
            id: id_str,
        })?;

        Ok(row.try_into_project(id)?)
    }

    async fn delete(&self, id: Uuid) -> PlanhubResult<()> {
        self.db
            .query(
                "BEGIN;
                 LET $board_ids = \
                     (SELECT VALUE meta::id(id) FROM board \
                      WHERE project_id = $project_id);
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
                 DELETE tag WHERE project_id = $project_id;
                 DELETE board WHERE project_id = $project_id;
                 DELETE type::record('project', $project_id);
                 COMMIT;",
            )
            .bind(("project_id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }
}
