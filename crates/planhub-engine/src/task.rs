//! Task service.
//!
//! Completion is never set directly: every create, move, or status-bearing
//! update ends with `Task::apply_completion`, so the stored pair always
//! reflects the holding status's final flag.

use chrono::Utc;
use planhub_core::error::{PlanhubError, PlanhubResult};
use planhub_core::models::board::Board;
use planhub_core::models::member::{OrganizationMember, OrganizationRole};
use planhub_core::models::tag::Tag;
use planhub_core::models::task::{CreateTask, Task, UpdateTask};
use planhub_core::repository::{
    BoardRepository, MemberRepository, OrganizationRepository, ProjectRepository,
    StatusRepository, TagRepository, TaskRepository, UserRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::access::{AccessChain, require_role};

#[derive(Clone)]
pub struct TaskService<O, P, B, M, S, T, U, G> {
    chain: AccessChain<O, P, B, M>,
    statuses: S,
    tasks: T,
    users: U,
    tags: G,
}

impl<O, P, B, M, S, T, U, G> TaskService<O, P, B, M, S, T, U, G>
where
    O: OrganizationRepository,
    P: ProjectRepository,
    B: BoardRepository,
    M: MemberRepository,
    S: StatusRepository,
    T: TaskRepository,
    U: UserRepository,
    G: TagRepository,
{
    pub fn new(
        chain: AccessChain<O, P, B, M>,
        statuses: S,
        tasks: T,
        users: U,
        tags: G,
    ) -> Self {
        Self {
            chain,
            statuses,
            tasks,
            users,
            tags,
        }
    }

    /// The caller becomes the task's creator regardless of the input's
    /// `creator_id`. A task created directly into a final status is
    /// completed immediately.
    pub async fn create(&self, user_id: Uuid, mut input: CreateTask) -> PlanhubResult<Task> {
        let (board, member) = self.chain.require_board(input.board_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "create task")?;

        let status = self.statuses.get_by_id(input.status_id).await?;
        if status.board_id != board.id {
            return Err(PlanhubError::Validation {
                message: "Status does not belong to this board".into(),
            });
        }
        if let Some(assignee_id) = input.assignee_id {
            self.users.get_by_id(assignee_id).await?;
        }
        input.creator_id = user_id;

        let mut task = self.tasks.create(input).await?;
        if task.apply_completion(status.is_final, Utc::now()) {
            task = self.tasks.save(task).await?;
        }

        info!(task_id = %task.id, board_id = %board.id, "Task created");
        Ok(task)
    }

    pub async fn get(&self, task_id: Uuid, user_id: Uuid) -> PlanhubResult<Task> {
        let (task, _, _) = self.require_task(task_id, user_id).await?;
        Ok(task)
    }

    pub async fn list_by_board(&self, board_id: Uuid, user_id: Uuid) -> PlanhubResult<Vec<Task>> {
        self.chain.require_board(board_id, user_id).await?;
        self.tasks.find_by_board(board_id).await
    }

    /// Moves the task into another status of its board and re-derives
    /// completion. A status from another board leaves the task unmodified
    /// and fails with a Validation error.
    pub async fn move_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        new_status_id: Uuid,
        order_index: Option<i64>,
    ) -> PlanhubResult<Task> {
        let (mut task, _, member) = self.require_task(task_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "move task")?;

        let status = self.statuses.get_by_id(new_status_id).await?;
        if status.board_id != task.board_id {
            return Err(PlanhubError::Validation {
                message: "Status does not belong to the same board as the task".into(),
            });
        }

        task.status_id = status.id;
        if let Some(order_index) = order_index {
            task.order_index = order_index;
        }
        task.apply_completion(status.is_final, Utc::now());

        self.tasks.save(task).await
    }

    /// PATCH semantics. A differing `status_id` is a status transition:
    /// board ownership is validated and completion re-derived. Otherwise
    /// the completion pair is untouched.
    pub async fn update(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        patch: UpdateTask,
    ) -> PlanhubResult<Task> {
        let (mut task, _, member) = self.require_task(task_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "update task")?;

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = Some(description);
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(order_index) = patch.order_index {
            task.order_index = order_index;
        }
        if let Some(assignee_id) = patch.assignee_id {
            self.users.get_by_id(assignee_id).await?;
            task.assignee_id = Some(assignee_id);
        }

        if let Some(status_id) = patch.status_id
            && status_id != task.status_id
        {
            let status = self.statuses.get_by_id(status_id).await?;
            if status.board_id != task.board_id {
                return Err(PlanhubError::Validation {
                    message: "Status does not belong to the same board as the task".into(),
                });
            }
            task.status_id = status.id;
            task.apply_completion(status.is_final, Utc::now());
        }

        self.tasks.save(task).await
    }

    /// Cascades to checklists, comments, and tag edges.
    pub async fn delete(&self, user_id: Uuid, task_id: Uuid) -> PlanhubResult<()> {
        let (task, _, member) = self.require_task(task_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "delete task")?;

        self.tasks.delete(task.id).await?;
        info!(task_id = %task_id, "Task deleted");
        Ok(())
    }

    // -- tags -----------------------------------------------------------

    pub async fn list_tags(&self, user_id: Uuid, task_id: Uuid) -> PlanhubResult<Vec<Tag>> {
        let (task, _, _) = self.require_task(task_id, user_id).await?;
        self.tags.find_by_task(task.id).await
    }

    /// Attaches a project tag; the tag must belong to the task's project.
    /// Attaching an already attached tag is a no-op.
    pub async fn attach_tag(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        tag_id: Uuid,
    ) -> PlanhubResult<()> {
        let (task, board, member) = self.require_task(task_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "tag task")?;

        let tag = self.tags.get_by_id(tag_id).await?;
        if tag.project_id != board.project_id {
            return Err(PlanhubError::Validation {
                message: "Tag does not belong to the task's project".into(),
            });
        }

        self.tags.attach_to_task(task.id, tag.id).await
    }

    pub async fn detach_tag(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        tag_id: Uuid,
    ) -> PlanhubResult<()> {
        let (task, _, member) = self.require_task(task_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "untag task")?;

        self.tags.detach_from_task(task.id, tag_id).await
    }

    async fn require_task(
        &self,
        task_id: Uuid,
        user_id: Uuid,
    ) -> PlanhubResult<(Task, Board, OrganizationMember)> {
        let task = self.tasks.get_by_id(task_id).await?;
        let (board, member) = self.chain.require_board(task.board_id, user_id).await?;
        Ok((task, board, member))
    }
}
