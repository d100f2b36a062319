//! SurrealDB implementation of [`TagRepository`].
//!
//! Tag/task assignments live in the `tagged` relation table. The unique
//! (in, out) index makes double-attachment a no-op rather than a
//! duplicate edge.

use chrono::{DateTime, Utc};
use planhub_core::error::PlanhubResult;
use planhub_core::models::tag::{CreateTag, Tag};
use planhub_core::repository::TagRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TagRow {
    project_id: String,
    name: String,
    color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct TagRowWithId {
    record_id: String,
    project_id: String,
    name: String,
    color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TagRow {
    fn try_into_tag(self, id: Uuid) -> Result<Tag, DbError> {
        Ok(Tag {
            id,
            project_id: Uuid::parse_str(&self.project_id)
                .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?,
            name: self.name,
            color: self.color,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TagRowWithId {
    fn try_into_tag(self) -> Result<Tag, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        TagRow {
            project_id: self.project_id,
            name: self.name,
            color: self.color,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_tag(id)
    }
}

/// SurrealDB implementation of the Tag repository.
#[derive(Clone)]
pub struct SurrealTagRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTagRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TagRepository for SurrealTagRepository<C> {
    async fn create(&self, input: CreateTag) -> PlanhubResult<Tag> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let color = input
            .color
            .unwrap_or_else(|| Tag::DEFAULT_COLOR.to_string());

        let result = self
            .db
            .query(
                "CREATE type::record('tag', $id) SET \
                 project_id = $project_id, name = $name, color = $color",
            )
            .bind(("id", id_str.clone()))
            .bind(("project_id", input.project_id.to_string()))
            .bind(("name", input.name))
            .bind(("color", color))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(row.try_into_tag(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PlanhubResult<Tag> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tag', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(row.try_into_tag(id)?)
    }

    async fn find_by_project(&self, project_id: Uuid) -> PlanhubResult<Vec<Tag>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tag \
                 WHERE project_id = $project_id ORDER BY name ASC",
            )
            .bind(("project_id", project_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRowWithId> = result.take(0).map_err(DbError::from)?;
        let tags = rows
            .into_iter()
            .map(TagRowWithId::try_into_tag)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tags)
    }

    async fn find_by_project_and_name(
        &self,
        project_id: Uuid,
        name: &str,
    ) -> PlanhubResult<Option<Tag>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tag \
                 WHERE project_id = $project_id AND name = $name",
            )
            .bind(("project_id", project_id.to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRowWithId> = result.take(0).map_err(DbError::from)?;
        let tag = rows
            .into_iter()
            .next()
            .map(TagRowWithId::try_into_tag)
            .transpose()?;

        Ok(tag)
    }

    async fn delete(&self, id: Uuid) -> PlanhubResult<()> {
        self.db
            .query(
                "BEGIN;
                 DELETE tagged WHERE out = type::record('tag', $tag_id);
                 DELETE type::record('tag', $tag_id);
                 COMMIT;",
            )
            .bind(("tag_id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }

    async fn attach_to_task(&self, task_id: Uuid, tag_id: Uuid) -> PlanhubResult<()> {
        let result = self
            .db
            .query(
                "RELATE (type::record('task', $task_id))\
                 ->tagged->\
                 (type::record('tag', $tag_id))",
            )
            .bind(("task_id", task_id.to_string()))
            .bind(("tag_id", tag_id.to_string()))
            .await
            .map_err(DbError::from)?;

        match result.check().map_err(DbError::from_check) {
            Ok(_) => Ok(()),
            // Edge already exists; attaching twice is a no-op.
            Err(DbError::UniqueViolation(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn detach_from_task(&self, task_id: Uuid, tag_id: Uuid) -> PlanhubResult<()> {
        self.db
            .query(
                "DELETE tagged \
                 WHERE in = type::record('task', $task_id) \
                 AND out = type::record('tag', $tag_id)",
            )
            .bind(("task_id", task_id.to_string()))
            .bind(("tag_id", tag_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }

    async fn find_by_task(&self, task_id: Uuid) -> PlanhubResult<Vec<Tag>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tag \
                 WHERE id IN (SELECT VALUE out FROM tagged \
                              WHERE in = type::record('task', $task_id)) \
                 ORDER BY name ASC",
            )
            .bind(("task_id", task_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRowWithId> = result.take(0).map_err(DbError::from)?;
        let tags = rows
            .into_iter()
            .map(TagRowWithId::try_into_tag)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tags)
    }
}
