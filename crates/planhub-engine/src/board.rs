//! Board service and the status engine.
//!
//! The status engine owns two invariants:
//! - at most one status per board carries `is_final = true`; promoting a
//!   status demotes every other final status and rewrites the affected
//!   tasks' completion in one repository transaction;
//! - every task's `is_completed`/`completed_at` pair is derived from its
//!   holding status's final flag. Any operation that changes a status's
//!   final flag re-syncs the affected tasks before returning, so callers
//!   always observe post-sync state.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use planhub_core::error::{PlanhubError, PlanhubResult};
use planhub_core::models::board::{Board, CreateBoard, UpdateBoard};
use planhub_core::models::member::OrganizationRole;
use planhub_core::models::status::{
    CreateTaskStatus, StatusOrder, TaskStatus, UpdateTaskStatus,
};
use planhub_core::repository::{
    BoardRepository, MemberRepository, OrganizationRepository, ProjectRepository,
    StatusRepository, TaskRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::access::{AccessChain, require_role};

/// Statuses every new board starts with: (name, color, index, is_final).
const DEFAULT_STATUSES: &[(&str, &str, i64, bool)] = &[
    ("To Do", "#6B7280", 0, false),
    ("In Progress", "#3B82F6", 1, false),
    ("Done", "#10B981", 2, true),
];

/// Outcome of a board-wide completion sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionSyncReport {
    /// Tasks examined.
    pub total: usize,
    /// Tasks whose completion pair changed.
    pub updated: usize,
    /// Of the updated, how many became completed.
    pub completed: usize,
    /// Of the updated, how many became not-completed.
    pub uncompleted: usize,
}

#[derive(Clone)]
pub struct BoardService<O, P, B, M, S, T> {
    chain: AccessChain<O, P, B, M>,
    boards: B,
    statuses: S,
    tasks: T,
}

impl<O, P, B, M, S, T> BoardService<O, P, B, M, S, T>
where
    O: OrganizationRepository,
    P: ProjectRepository,
    B: BoardRepository,
    M: MemberRepository,
    S: StatusRepository,
    T: TaskRepository,
{
    pub fn new(chain: AccessChain<O, P, B, M>, boards: B, statuses: S, tasks: T) -> Self {
        Self {
            chain,
            boards,
            statuses,
            tasks,
        }
    }

    // -- boards ---------------------------------------------------------

    /// Creates the board together with its three default status columns.
    pub async fn create_board(&self, user_id: Uuid, input: CreateBoard) -> PlanhubResult<Board> {
        let (_, member) = self.chain.require_project(input.project_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "create board")?;

        let board = self.boards.create(input).await?;
        for &(name, color, order_index, is_final) in DEFAULT_STATUSES {
            self.statuses
                .create(CreateTaskStatus {
                    board_id: board.id,
                    name: name.into(),
                    color: Some(color.into()),
                    order_index,
                    is_final: Some(is_final),
                })
                .await?;
        }

        info!(board_id = %board.id, "Board created with default statuses");
        Ok(board)
    }

    pub async fn get_board(&self, board_id: Uuid, user_id: Uuid) -> PlanhubResult<Board> {
        let (board, _) = self.chain.require_board(board_id, user_id).await?;
        Ok(board)
    }

    pub async fn list_boards(&self, project_id: Uuid, user_id: Uuid) -> PlanhubResult<Vec<Board>> {
        let (project, _) = self.chain.require_project(project_id, user_id).await?;
        self.boards.list_by_project(project.id).await
    }

    pub async fn update_board(
        &self,
        board_id: Uuid,
        user_id: Uuid,
        input: UpdateBoard,
    ) -> PlanhubResult<Board> {
        let (board, member) = self.chain.require_board(board_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "update board")?;
        self.boards.update(board.id, input).await
    }

    /// Admin and up. Cascades to statuses, tasks, and task children.
    pub async fn delete_board(&self, board_id: Uuid, user_id: Uuid) -> PlanhubResult<()> {
        let (board, member) = self.chain.require_board(board_id, user_id).await?;
        require_role(&member, OrganizationRole::Admin, "delete board")?;
        self.boards.delete(board.id).await?;
        info!(board_id = %board_id, "Board deleted");
        Ok(())
    }

    // -- statuses -------------------------------------------------------

    pub async fn list_statuses(
        &self,
        board_id: Uuid,
        user_id: Uuid,
    ) -> PlanhubResult<Vec<TaskStatus>> {
        self.chain.require_board(board_id, user_id).await?;
        self.statuses.find_by_board(board_id).await
    }

    /// Creates a status. When the new status is final, every other final
    /// status on the board is demoted and the affected tasks re-synced.
    pub async fn create_status(
        &self,
        user_id: Uuid,
        input: CreateTaskStatus,
    ) -> PlanhubResult<TaskStatus> {
        let (board, member) = self.chain.require_board(input.board_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "create status")?;

        let status = self.statuses.create(input).await?;
        if status.is_final {
            self.promote(board.id, &status).await?;
        }

        Ok(status)
    }

    /// PATCH semantics; the status must belong to the given board. When
    /// the final flag changes in either direction, the status's tasks are
    /// re-synced before the updated status is returned.
    pub async fn update_status(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        status_id: Uuid,
        patch: UpdateTaskStatus,
    ) -> PlanhubResult<TaskStatus> {
        let (board, member) = self.chain.require_board(board_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "update status")?;

        let mut status = self.owned_status(&board, status_id).await?;
        let was_final = status.is_final;

        if let Some(name) = patch.name {
            status.name = name;
        }
        if let Some(color) = patch.color {
            status.color = color;
        }
        if let Some(order_index) = patch.order_index {
            status.order_index = order_index;
        }
        if let Some(is_final) = patch.is_final {
            status.is_final = is_final;
        }

        let saved = self.statuses.save(status).await?;

        if !was_final && saved.is_final {
            self.promote(board.id, &saved).await?;
        } else if was_final != saved.is_final {
            self.sync_status_tasks(&saved).await?;
        }

        Ok(saved)
    }

    /// A status still holding tasks cannot be deleted.
    pub async fn delete_status(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        status_id: Uuid,
    ) -> PlanhubResult<()> {
        let (board, member) = self.chain.require_board(board_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "delete status")?;

        let status = self.owned_status(&board, status_id).await?;
        if self.tasks.count_by_status(status.id).await? > 0 {
            return Err(PlanhubError::BusinessLogic {
                message: "Cannot delete status with existing tasks".into(),
            });
        }

        self.statuses.delete(status.id).await
    }

    /// Bulk reorder. The batch is validated up front — non-empty, every
    /// status board-owned, no duplicate statuses or target indices — then
    /// written in one transaction. Returns the re-read, re-sorted list.
    pub async fn reorder_statuses(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        entries: Vec<StatusOrder>,
    ) -> PlanhubResult<Vec<TaskStatus>> {
        let (board, member) = self.chain.require_board(board_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "reorder statuses")?;

        if entries.is_empty() {
            return Err(PlanhubError::Validation {
                message: "Status order list cannot be empty".into(),
            });
        }

        let owned: HashSet<Uuid> = self
            .statuses
            .find_by_board(board.id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();

        let mut seen_statuses = HashSet::new();
        let mut seen_indices = HashSet::new();
        for entry in &entries {
            if !owned.contains(&entry.status_id) {
                // Resolve to NotFound vs cross-board AccessDenied.
                self.statuses.get_by_id(entry.status_id).await?;
                return Err(PlanhubError::access_denied(
                    "Status does not belong to this board",
                ));
            }
            if !seen_statuses.insert(entry.status_id) {
                return Err(PlanhubError::Validation {
                    message: format!("Duplicate status in reorder: {}", entry.status_id),
                });
            }
            if !seen_indices.insert(entry.order_index) {
                return Err(PlanhubError::Validation {
                    message: format!("Duplicate order index: {}", entry.order_index),
                });
            }
        }

        self.statuses.apply_order(board.id, entries).await?;
        self.statuses.find_by_board(board.id).await
    }

    // -- completion sync ------------------------------------------------

    /// Re-derives completion for every task on the board and persists
    /// only actual changes. Idempotent: an immediate second run reports
    /// zero updates.
    pub async fn sync_task_completion(
        &self,
        board_id: Uuid,
        user_id: Uuid,
    ) -> PlanhubResult<CompletionSyncReport> {
        let (board, member) = self.chain.require_board(board_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "sync task completion")?;

        let finals: HashMap<Uuid, bool> = self
            .statuses
            .find_by_board(board.id)
            .await?
            .into_iter()
            .map(|s| (s.id, s.is_final))
            .collect();

        let tasks = self.tasks.find_by_board(board.id).await?;
        let now = Utc::now();
        let mut report = CompletionSyncReport {
            total: tasks.len(),
            ..Default::default()
        };

        for mut task in tasks {
            let Some(&is_final) = finals.get(&task.status_id) else {
                continue;
            };
            if task.apply_completion(is_final, now) {
                report.updated += 1;
                if task.is_completed {
                    report.completed += 1;
                } else {
                    report.uncompleted += 1;
                }
                self.tasks.save(task).await?;
            }
        }

        if report.updated > 0 {
            info!(
                board_id = %board.id,
                updated = report.updated,
                completed = report.completed,
                uncompleted = report.uncompleted,
                "Task completion synced"
            );
        }
        Ok(report)
    }

    // -- internals ------------------------------------------------------

    /// Demotes every other final status and re-derives completion for the
    /// demoted statuses' tasks and the newly final one's. The whole
    /// promotion is one repository transaction, so a failure rolls back
    /// the final-flag change together with every task write.
    async fn promote(&self, board_id: Uuid, status: &TaskStatus) -> PlanhubResult<()> {
        let demoted = self
            .statuses
            .promote(board_id, status.id, Utc::now())
            .await?;
        if !demoted.is_empty() {
            info!(
                board_id = %board_id,
                status_id = %status.id,
                demoted = demoted.len(),
                "Final status changed"
            );
        }
        Ok(())
    }

    /// Re-derives completion for one status's tasks. The status carries
    /// its post-mutation final flag; demoted statuses arrive already
    /// flipped to `is_final = false`.
    async fn sync_status_tasks(&self, status: &TaskStatus) -> PlanhubResult<usize> {
        let tasks = self.tasks.find_by_status(status.id).await?;
        let now = Utc::now();
        let mut updated = 0;
        for mut task in tasks {
            if task.apply_completion(status.is_final, now) {
                self.tasks.save(task).await?;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn owned_status(&self, board: &Board, status_id: Uuid) -> PlanhubResult<TaskStatus> {
        let status = self.statuses.get_by_id(status_id).await?;
        if status.board_id != board.id {
            return Err(PlanhubError::access_denied(
                "Status does not belong to this board",
            ));
        }
        Ok(status)
    }
}
