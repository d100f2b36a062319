//! SurrealDB implementation of [`StatusRepository`].
//!
//! The two mutation paths with cross-row effects, [`promote`] and
//! [`apply_order`], each run as a single SurrealDB transaction so the
//! single-final invariant and the (board, order_index) unique index are
//! never observed mid-write.
//!
//! [`promote`]: StatusRepository::promote
//! [`apply_order`]: StatusRepository::apply_order

use chrono::{DateTime, Utc};
use planhub_core::error::PlanhubResult;
use planhub_core::models::status::{CreateTaskStatus, StatusOrder, TaskStatus};
use planhub_core::repository::StatusRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct StatusRow {
    board_id: String,
    name: String,
    color: String,
    order_index: i64,
    is_final: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct StatusRowWithId {
    record_id: String,
    board_id: String,
    name: String,
    color: String,
    order_index: i64,
    is_final: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StatusRow {
    fn try_into_status(self, id: Uuid) -> Result<TaskStatus, DbError> {
        Ok(TaskStatus {
            id,
            board_id: Uuid::parse_str(&self.board_id)
                .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?,
            name: self.name,
            color: self.color,
            order_index: self.order_index,
            is_final: self.is_final,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl StatusRowWithId {
    fn try_into_status(self) -> Result<TaskStatus, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        StatusRow {
            board_id: self.board_id,
            name: self.name,
            color: self.color,
            order_index: self.order_index,
            is_final: self.is_final,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_status(id)
    }
}

/// SurrealDB implementation of the TaskStatus repository.
#[derive(Clone)]
pub struct SurrealStatusRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealStatusRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> StatusRepository for SurrealStatusRepository<C> {
    async fn create(&self, input: CreateTaskStatus) -> PlanhubResult<TaskStatus> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let color = input
            .color
            .unwrap_or_else(|| TaskStatus::DEFAULT_COLOR.to_string());
        let is_final = input.is_final.unwrap_or(false);

        let result = self
            .db
            .query(
                "CREATE type::record('task_status', $id) SET \
                 board_id = $board_id, name = $name, color = $color, \
                 order_index = $order_index, is_final = $is_final",
            )
            .bind(("id", id_str.clone()))
            .bind(("board_id", input.board_id.to_string()))
            .bind(("name", input.name))
            .bind(("color", color))
            .bind(("order_index", input.order_index))
            .bind(("is_final", is_final))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<StatusRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task_status".into(),
            id: id_str,
        })?;

        Ok(row.try_into_status(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PlanhubResult<TaskStatus> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('task_status', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StatusRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task_status".into(),
            id: id_str,
        })?;

        Ok(row.try_into_status(id)?)
    }

    async fn find_by_board(&self, board_id: Uuid) -> PlanhubResult<Vec<TaskStatus>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM task_status \
                 WHERE board_id = $board_id ORDER BY order_index ASC",
            )
            .bind(("board_id", board_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StatusRowWithId> = result.take(0).map_err(DbError::from)?;
        let statuses = rows
            .into_iter()
            .map(StatusRowWithId::try_into_status)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(statuses)
    }

    async fn find_by_board_and_name(
        &self,
        board_id: Uuid,
        name: &str,
    ) -> PlanhubResult<Option<TaskStatus>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM task_status \
                 WHERE board_id = $board_id AND name = $name",
            )
            .bind(("board_id", board_id.to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StatusRowWithId> = result.take(0).map_err(DbError::from)?;
        let status = rows
            .into_iter()
            .next()
            .map(StatusRowWithId::try_into_status)
            .transpose()?;

        Ok(status)
    }

    async fn find_by_board_and_order_index(
        &self,
        board_id: Uuid,
        order_index: i64,
    ) -> PlanhubResult<Option<TaskStatus>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM task_status \
                 WHERE board_id = $board_id AND order_index = $order_index",
            )
            .bind(("board_id", board_id.to_string()))
            .bind(("order_index", order_index))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StatusRowWithId> = result.take(0).map_err(DbError::from)?;
        let status = rows
            .into_iter()
            .next()
            .map(StatusRowWithId::try_into_status)
            .transpose()?;

        Ok(status)
    }

    async fn save(&self, status: TaskStatus) -> PlanhubResult<TaskStatus> {
        let id = status.id;
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('task_status', $id) SET \
                 name = $name, color = $color, order_index = $order_index, \
                 is_final = $is_final, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", status.name))
            .bind(("color", status.color))
            .bind(("order_index", status.order_index))
            .bind(("is_final", status.is_final))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<StatusRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task_status".into(),
            id: id_str,
        })?;

        Ok(row.try_into_status(id)?)
    }

    async fn promote(
        &self,
        board_id: Uuid,
        status_id: Uuid,
        now: DateTime<Utc>,
    ) -> PlanhubResult<Vec<TaskStatus>> {
        // The demotion and both task rewrites share one transaction: a
        // failure anywhere rolls back the final-flag change together with
        // every task write, and the returned set is exactly the set that
        // got demoted. Tasks already completed with a timestamp are
        // excluded from the promoted-side rewrite, which keeps their
        // original completion time.
        let result = self
            .db
            .query(
                "BEGIN;
                 SELECT meta::id(id) AS record_id, * FROM task_status \
                     WHERE board_id = $board_id AND is_final = true \
                     AND meta::id(id) != $status_id;
                 LET $demoted_ids = \
                     (SELECT VALUE meta::id(id) FROM task_status \
                      WHERE board_id = $board_id AND is_final = true \
                      AND meta::id(id) != $status_id);
                 UPDATE task_status \
                     SET is_final = false, updated_at = time::now() \
                     WHERE board_id = $board_id AND is_final = true \
                     AND meta::id(id) != $status_id;
                 UPDATE task \
                     SET is_completed = false, completed_at = NONE, \
                     updated_at = time::now() \
                     WHERE status_id IN $demoted_ids \
                     AND (is_completed = true OR completed_at != NONE);
                 UPDATE task \
                     SET is_completed = true, completed_at = $now, \
                     updated_at = time::now() \
                     WHERE status_id = $status_id \
                     AND (is_completed = false OR completed_at = NONE);
                 COMMIT;",
            )
            .bind(("board_id", board_id.to_string()))
            .bind(("status_id", status_id.to_string()))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<StatusRowWithId> = result.take(0).map_err(DbError::from)?;
        let demoted = rows
            .into_iter()
            .map(StatusRowWithId::try_into_status)
            .collect::<Result<Vec<_>, _>>()?;

        if !demoted.is_empty() {
            debug!(
                board_id = %board_id,
                count = demoted.len(),
                "Demoted previous final statuses"
            );
        }

        Ok(demoted)
    }

    async fn apply_order(
        &self,
        board_id: Uuid,
        entries: Vec<StatusOrder>,
    ) -> PlanhubResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        // Phase one parks every touched status at a negative index, phase
        // two writes the final values. Untouched statuses keep non-negative
        // indices, so neither phase can trip the (board, order_index)
        // unique index.
        let mut statements = vec!["BEGIN;".to_string()];
        for (i, _) in entries.iter().enumerate() {
            statements.push(format!(
                "UPDATE task_status SET order_index = {}, updated_at = time::now() \
                 WHERE board_id = $board_id AND meta::id(id) = $status_{i};",
                -(i as i64) - 1
            ));
        }
        for (i, _) in entries.iter().enumerate() {
            statements.push(format!(
                "UPDATE task_status SET order_index = $index_{i} \
                 WHERE board_id = $board_id AND meta::id(id) = $status_{i};"
            ));
        }
        statements.push("COMMIT;".to_string());
        let query = statements.join("\n");

        let mut builder = self
            .db
            .query(&query)
            .bind(("board_id", board_id.to_string()));
        for (i, entry) in entries.iter().enumerate() {
            builder = builder
                .bind((format!("status_{i}"), entry.status_id.to_string()))
                .bind((format!("index_{i}"), entry.order_index));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        debug!(board_id = %board_id, count = entries.len(), "Applied status reorder");

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> PlanhubResult<()> {
        self.db
            .query("DELETE type::record('task_status', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }
}
