//! SurrealDB implementation of [`TaskRepository`].

use chrono::{DateTime, Utc};
use planhub_core::error::PlanhubResult;
use planhub_core::models::task::{CreateTask, Task, TaskPriority};
use planhub_core::repository::TaskRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TaskRow {
    board_id: String,
    status_id: String,
    title: String,
    description: Option<String>,
    priority: String,
    due_date: Option<DateTime<Utc>>,
    order_index: i64,
    is_completed: bool,
    completed_at: Option<DateTime<Utc>>,
    creator_id: String,
    assignee_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct TaskRowWithId {
    record_id: String,
    board_id: String,
    status_id: String,
    title: String,
    description: Option<String>,
    priority: String,
    due_date: Option<DateTime<Utc>>,
    order_index: i64,
    is_completed: bool,
    completed_at: Option<DateTime<Utc>>,
    creator_id: String,
    assignee_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value)
        .map_err(|e| DbError::Query(format!("invalid UUID in {field}: {e}")))
}

impl TaskRow {
    fn try_into_task(self, id: Uuid) -> Result<Task, DbError> {
        Ok(Task {
            id,
            board_id: parse_uuid("board_id", &self.board_id)?,
            status_id: parse_uuid("status_id", &self.status_id)?,
            title: self.title,
            description: self.description,
            priority: TaskPriority::parse(&self.priority)
                .map_err(|e| DbError::Query(e.to_string()))?,
            due_date: self.due_date,
            order_index: self.order_index,
            is_completed: self.is_completed,
            completed_at: self.completed_at,
            creator_id: parse_uuid("creator_id", &self.creator_id)?,
            assignee_id: self
                .assignee_id
                .as_deref()
                .map(|v| parse_uuid("assignee_id", v))
                .transpose()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TaskRowWithId {
    fn try_into_task(self) -> Result<Task, DbError> {
        let id = parse_uuid("record_id", &self.record_id)?;
        TaskRow {
            board_id: self.board_id,
            status_id: self.status_id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            order_index: self.order_index,
            is_completed: self.is_completed,
            completed_at: self.completed_at,
            creator_id: self.creator_id,
            assignee_id: self.assignee_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_task(id)
    }
}

/// SurrealDB implementation of the Task repository.
#[derive(Clone)]
pub struct SurrealTaskRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTaskRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TaskRepository for SurrealTaskRepository<C> {
    async fn create(&self, input: CreateTask) -> PlanhubResult<Task> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let priority = input.priority.unwrap_or(TaskPriority::Medium);
        let order_index = input.order_index.unwrap_or(0);

        let result = self
            .db
            .query(
                "CREATE type::record('task', $id) SET \
                 board_id = $board_id, status_id = $status_id, \
                 title = $title, description = $description, \
                 priority = $priority, due_date = $due_date, \
                 order_index = $order_index, creator_id = $creator_id, \
                 assignee_id = $assignee_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("board_id", input.board_id.to_string()))
            .bind(("status_id", input.status_id.to_string()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("priority", priority.as_str().to_string()))
            .bind(("due_date", input.due_date))
            .bind(("order_index", order_index))
            .bind(("creator_id", input.creator_id.to_string()))
            .bind(("assignee_id", input.assignee_id.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task".into(),
            id: id_str,
        })?;

        Ok(row.try_into_task(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PlanhubResult<Task> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('task', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task".into(),
            id: id_str,
        })?;

        Ok(row.try_into_task(id)?)
    }

    async fn find_by_board(&self, board_id: Uuid) -> PlanhubResult<Vec<Task>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM task \
                 WHERE board_id = $board_id ORDER BY order_index ASC",
            )
            .bind(("board_id", board_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TaskRowWithId> = result.take(0).map_err(DbError::from)?;
        let tasks = rows
            .into_iter()
            .map(TaskRowWithId::try_into_task)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    async fn find_by_status(&self, status_id: Uuid) -> PlanhubResult<Vec<Task>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM task \
                 WHERE status_id = $status_id ORDER BY order_index ASC",
            )
            .bind(("status_id", status_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TaskRowWithId> = result.take(0).map_err(DbError::from)?;
        let tasks = rows
            .into_iter()
            .map(TaskRowWithId::try_into_task)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    async fn count_by_status(&self, status_id: Uuid) -> PlanhubResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM task \
                 WHERE status_id = $status_id GROUP ALL",
            )
            .bind(("status_id", status_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(|r| r.total).unwrap_or(0))
    }

    async fn save(&self, task: Task) -> PlanhubResult<Task> {
        let id = task.id;
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('task', $id) SET \
                 status_id = $status_id, title = $title, \
                 description = $description, priority = $priority, \
                 due_date = $due_date, order_index = $order_index, \
                 is_completed = $is_completed, completed_at = $completed_at, \
                 assignee_id = $assignee_id, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("status_id", task.status_id.to_string()))
            .bind(("title", task.title))
            .bind(("description", task.description))
            .bind(("priority", task.priority.as_str().to_string()))
            .bind(("due_date", task.due_date))
            .bind(("order_index", task.order_index))
            .bind(("is_completed", task.is_completed))
            .bind(("completed_at", task.completed_at))
            .bind(("assignee_id", task.assignee_id.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "task".into(),
            id: id_str,
        })?;

        Ok(row.try_into_task(id)?)
    }

    async fn delete(&self, id: Uuid) -> PlanhubResult<()> {
        self.db
            .query(
                "BEGIN;
                 DELETE checklist WHERE task_id = $task_id;
                 DELETE task_comment WHERE task_id = $task_id;
                 DELETE tagged WHERE in = type::record('task', $task_id);
                 DELETE type::record('task', $task_id);
                 COMMIT;",
            )
            .bind(("task_id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }
}
