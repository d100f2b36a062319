//! Task comment service. Edits are in-place, author-only, and flip
//! `is_edited` permanently.

use planhub_core::error::{PlanhubError, PlanhubResult};
use planhub_core::models::comment::{CreateComment, TaskComment};
use planhub_core::models::member::{OrganizationMember, OrganizationRole};
use planhub_core::models::task::Task;
use planhub_core::repository::{
    BoardRepository, CommentRepository, MemberRepository, OrganizationRepository,
    ProjectRepository, TaskRepository,
};
use uuid::Uuid;

use crate::access::{AccessChain, require_role};

#[derive(Clone)]
pub struct CommentService<O, P, B, M, T, C> {
    chain: AccessChain<O, P, B, M>,
    tasks: T,
    comments: C,
}

impl<O, P, B, M, T, C> CommentService<O, P, B, M, T, C>
where
    O: OrganizationRepository,
    P: ProjectRepository,
    B: BoardRepository,
    M: MemberRepository,
    T: TaskRepository,
    C: CommentRepository,
{
    pub fn new(chain: AccessChain<O, P, B, M>, tasks: T, comments: C) -> Self {
        Self {
            chain,
            tasks,
            comments,
        }
    }

    /// Newest first.
    pub async fn list(&self, user_id: Uuid, task_id: Uuid) -> PlanhubResult<Vec<TaskComment>> {
        let (task, _) = self.require_task(task_id, user_id).await?;
        self.comments.find_by_task(task.id).await
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        content: String,
    ) -> PlanhubResult<TaskComment> {
        let (task, member) = self.require_task(task_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "comment on task")?;

        self.comments
            .create(CreateComment {
                task_id: task.id,
                author_id: user_id,
                content,
            })
            .await
    }

    pub async fn edit(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        comment_id: Uuid,
        content: String,
    ) -> PlanhubResult<TaskComment> {
        let (task, _) = self.require_task(task_id, user_id).await?;

        let mut comment = self
            .comments
            .find_by_task_and_id(task.id, comment_id)
            .await?
            .ok_or_else(|| PlanhubError::not_found("comment", comment_id))?;
        if comment.author_id != user_id {
            return Err(PlanhubError::access_denied(
                "Only the author can edit a comment",
            ));
        }

        comment.content = content;
        comment.is_edited = true;
        self.comments.save(comment).await
    }

    /// The author or an Admin can delete.
    pub async fn delete(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        comment_id: Uuid,
    ) -> PlanhubResult<()> {
        let (task, member) = self.require_task(task_id, user_id).await?;

        let comment = self
            .comments
            .find_by_task_and_id(task.id, comment_id)
            .await?
            .ok_or_else(|| PlanhubError::not_found("comment", comment_id))?;
        if comment.author_id != user_id {
            require_role(&member, OrganizationRole::Admin, "delete another member's comment")?;
        }

        self.comments.delete(comment.id).await
    }

    async fn require_task(
        &self,
        task_id: Uuid,
        user_id: Uuid,
    ) -> PlanhubResult<(Task, OrganizationMember)> {
        let task = self.tasks.get_by_id(task_id).await?;
        let (_, member) = self.chain.require_board(task.board_id, user_id).await?;
        Ok((task, member))
    }
}
