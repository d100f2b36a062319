//! SurrealDB implementation of [`ChecklistRepository`].

use chrono::{DateTime, Utc};
use planhub_core::error::PlanhubResult;
use planhub_core::models::checklist::{Checklist, CreateChecklist};
use planhub_core::repository::ChecklistRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ChecklistRow {
    task_id: String,
    title: String,
    is_completed: bool,
    completed_at: Option<DateTime<Utc>>,
    order_index: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ChecklistRowWithId {
    record_id: String,
    task_id: String,
    title: String,
    is_completed: bool,
    completed_at: Option<DateTime<Utc>>,
    order_index: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChecklistRow {
    fn try_into_checklist(self, id: Uuid) -> Result<Checklist, DbError> {
        Ok(Checklist {
            id,
            task_id: Uuid::parse_str(&self.task_id)
                .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?,
            title: self.title,
            is_completed: self.is_completed,
            completed_at: self.completed_at,
            order_index: self.order_index,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ChecklistRowWithId {
    fn try_into_checklist(self) -> Result<Checklist, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        ChecklistRow {
            task_id: self.task_id,
            title: self.title,
            is_completed: self.is_completed,
            completed_at: self.completed_at,
            order_index: self.order_index,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_checklist(id)
    }
}

/// SurrealDB implementation of the Checklist repository.
#[derive(Clone)]
pub struct SurrealChecklistRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealChecklistRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ChecklistRepository for SurrealChecklistRepository<C> {
    async fn create(&self, input: CreateChecklist) -> PlanhubResult<Checklist> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let order_index = input.order_index.unwrap_or(0);

        let result = self
            .db
            .query(
                "CREATE type::record('checklist', $id) SET \
                 task_id = $task_id, title = $title, order_index = $order_index",
            )
            .bind(("id", id_str.clone()))
            .bind(("task_id", input.task_id.to_string()))
            .bind(("title", input.title))
            .bind(("order_index", order_index))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<ChecklistRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "checklist".into(),
            id: id_str,
        })?;

        Ok(row.try_into_checklist(id)?)
    }

    async fn find_by_task(&self, task_id: Uuid) -> PlanhubResult<Vec<Checklist>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM checklist \
                 WHERE task_id = $task_id ORDER BY created_at ASC",
            )
            .bind(("task_id", task_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ChecklistRowWithId> = result.take(0).map_err(DbError::from)?;
        let checklists = rows
            .into_iter()
            .map(ChecklistRowWithId::try_into_checklist)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(checklists)
    }

    async fn find_by_task_and_id(
        &self,
        task_id: Uuid,
        id: Uuid,
    ) -> PlanhubResult<Option<Checklist>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('checklist', $id) \
                 WHERE task_id = $task_id",
            )
            .bind(("id", id.to_string()))
            .bind(("task_id", task_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ChecklistRow> = result.take(0).map_err(DbError::from)?;
        let checklist = rows
            .into_iter()
            .next()
            .map(|row| row.try_into_checklist(id))
            .transpose()?;

        Ok(checklist)
    }

    async fn save(&self, checklist: Checklist) -> PlanhubResult<Checklist> {
        let id = checklist.id;
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('checklist', $id) SET \
                 title = $title, is_completed = $is_completed, \
                 completed_at = $completed_at, order_index = $order_index, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("title", checklist.title))
            .bind(("is_completed", checklist.is_completed))
            .bind(("completed_at", checklist.completed_at))
            .bind(("order_index", checklist.order_index))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<ChecklistRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "checklist".into(),
            id: id_str,
        })?;

        Ok(row.try_into_checklist(id)?)
    }

    async fn delete(&self, id: Uuid) -> PlanhubResult<()> {
        self.db
            .query("DELETE type::record('checklist', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }
}
