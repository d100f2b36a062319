//! SurrealDB implementation of [`BoardRepository`].

use chrono::{DateTime, Utc};
use planhub_core::error::PlanhubResult;
use planhub_core::models::board::{Board, BoardViewType, CreateBoard, UpdateBoard};
use planhub_core::repository::BoardRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct BoardRow {
    project_id: String,
    name: String,
    description: Option<String>,
    view_type: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct BoardRowWithId {
    record_id: String,
    project_id: String,
    name: String,
    description: Option<String>,
    view_type: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BoardRow {
    fn try_into_board(self, id: Uuid) -> Result<Board, DbError> {
        Ok(Board {
            id,
            project_id: Uuid::parse_str(&self.project_id)
                .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?,
            name: self.name,
            description: self.description,
            view_type: BoardViewType::parse(&self.view_type)
                .map_err(|e| DbError::Query(e.to_string()))?,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl BoardRowWithId {
    fn try_into_board(self) -> Result<Board, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        BoardRow {
            project_id: self.project_id,
            name: self.name,
            description: self.description,
            view_type: self.view_type,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_board(id)
    }
}

/// SurrealDB implementation of the Board repository.
#[derive(Clone)]
pub struct SurrealBoardRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealBoardRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> BoardRepository for SurrealBoardRepository<C> {
    async fn create(&self, input: CreateBoard) -> PlanhubResult<Board> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let view_type = input.view_type.unwrap_or(BoardViewType::Kanban);

        let result = self
            .db
            .query(
                "CREATE type::record('board', $id) SET \
                 project_id = $project_id, name = $name, \
                 description = $description, view_type = $view_type",
            )
            .bind(("id", id_str.clone()))
            .bind(("project_id", input.project_id.to_string()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("view_type", view_type.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<BoardRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "board".into(),
            id: id_str,
        })?;

        Ok(row.try_into_board(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PlanhubResult<Board> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('board', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BoardRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "board".into(),
            id: id_str,
        })?;

        Ok(row.try_into_board(id)?)
    }

    async fn list_by_project(&self, project_id: Uuid) -> PlanhubResult<Vec<Board>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM board \
                 WHERE project_id = $project_id ORDER BY created_at ASC",
            )
            .bind(("project_id", project_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BoardRowWithId> = result.take(0).map_err(DbError::from)?;
        let boards = rows
            .into_iter()
            .map(BoardRowWithId::try_into_board)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(boards)
    }

    async fn update(&self, id: Uuid, input: UpdateBoard) -> PlanhubResult<Board> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.view_type.is_some() {
            sets.push("view_type = $view_type");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('board', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(view_type) = input.view_type {
            builder = builder.bind(("view_type", view_type.as_str().to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<BoardRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "board".into(),
            id: id_str,
        })?;

        Ok(row.try_into_board(id)?)
    }

    async fn delete(&self, id: Uuid) -> PlanhubResult<()> {
        self.db
            .query(
                "BEGIN;
                 LET $tasks = \
                     (SELECT VALUE id FROM task WHERE board_id = $board_id);
                 LET $task_ids = \
                     (SELECT VALUE meta::id(id) FROM task \
                      WHERE board_id = $board_id);
                 DELETE checklist WHERE task_id IN $task_ids;
                 DELETE task_comment WHERE task_id IN $task_ids;
                 DELETE tagged WHERE in IN $tasks;
                 DELETE task WHERE board_id = $board_id;
                 DELETE task_status WHERE board_id = $board_id;
                 DELETE type::record('board', $board_id);
                 COMMIT;",
            )
            .bind(("board_id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }
}
