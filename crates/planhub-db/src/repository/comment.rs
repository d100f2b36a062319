//! SurrealDB implementation of [`CommentRepository`].

use chrono::{DateTime, Utc};
use planhub_core::error::PlanhubResult;
use planhub_core::models::comment::{CreateComment, TaskComment};
use planhub_core::repository::CommentRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CommentRow {
    task_id: String,
    author_id: String,
    content: String,
    is_edited: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CommentRowWithId {
    record_id: String,
    task_id: String,
    author_id: String,
    content: String,
    is_edited: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CommentRow {
    fn try_into_comment(self, id: Uuid) -> Result<TaskComment, DbError> {
        Ok(TaskComment {
            id,
            task_id: Uuid::parse_str(&self.task_id)
                .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?,
            author_id: Uuid::parse_str(&self.author_id)
                .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?,
            content: self.content,
            is_edited: self.is_edited,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl CommentRowWithId {
    fn try_into_comment(self) -> Result<TaskComment, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        CommentRow {
            task_id: self.task_id,
            author_id: self.author_id,
            content: self.content,
            is_edited: self.is_edited,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_comment(id)
    }
}

/// SurrealDB implementation of the TaskComment repository.
#[derive(Clone)]
pub struct SurrealCommentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCommentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CommentRepository for SurrealCommentRepository<C> {
    async fn create(&self, input: CreateComment) -> PlanhubResult<TaskComment> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('task_comment', $id) SET \
                 task_id = $task_id, author_id = $author_id, content = $content",
            )
            .bind(("id", id_str.clone()))
            .bind(("task_id", input.task_id.to_string()))
            .bind(("author_id", input.author_id.to_string()))
            .bind(("content", input.content))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<CommentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task_comment".into(),
            id: id_str,
        })?;

        Ok(row.try_into_comment(id)?)
    }

    async fn find_by_task(&self, task_id: Uuid) -> PlanhubResult<Vec<TaskComment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM task_comment \
                 WHERE task_id = $task_id ORDER BY created_at DESC",
            )
            .bind(("task_id", task_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CommentRowWithId> = result.take(0).map_err(DbError::from)?;
        let comments = rows
            .into_iter()
            .map(CommentRowWithId::try_into_comment)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    async fn find_by_task_and_id(
        &self,
        task_id: Uuid,
        id: Uuid,
    ) -> PlanhubResult<Option<TaskComment>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('task_comment', $id) \
                 WHERE task_id = $task_id",
            )
            .bind(("id", id.to_string()))
            .bind(("task_id", task_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CommentRow> = result.take(0).map_err(DbError::from)?;
        let comment = rows
            .into_iter()
            .next()
            .map(|row| row.try_into_comment(id))
            .transpose()?;

        Ok(comment)
    }

    async fn save(&self, comment: TaskComment) -> PlanhubResult<TaskComment> {
        let id = comment.id;
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('task_comment', $id) SET \
                 content = $content, is_edited = $is_edited, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("content", comment.content))
            .bind(("is_edited", comment.is_edited))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<CommentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task_comment".into(),
            id: id_str,
        })?;

        Ok(row.try_into_comment(id)?)
    }

    async fn delete(&self, id: Uuid) -> PlanhubResult<()> {
        self.db
            .query("DELETE type::record('task_comment', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }
}
