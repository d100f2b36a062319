//! Checklist service. Checklist completion is tracked per item and never
//! propagates to the owning task.

use chrono::Utc;
use planhub_core::error::{PlanhubError, PlanhubResult};
use planhub_core::models::checklist::{Checklist, CreateChecklist, UpdateChecklist};
use planhub_core::models::member::{OrganizationMember, OrganizationRole};
use planhub_core::models::task::Task;
use planhub_core::repository::{
    BoardRepository, ChecklistRepository, MemberRepository, OrganizationRepository,
    ProjectRepository, TaskRepository,
};
use uuid::Uuid;

use crate::access::{AccessChain, require_role};

#[derive(Clone)]
pub struct ChecklistService<O, P, B, M, T, K> {
    chain: AccessChain<O, P, B, M>,
    tasks: T,
    checklists: K,
}

impl<O, P, B, M, T, K> ChecklistService<O, P, B, M, T, K>
where
    O: OrganizationRepository,
    P: ProjectRepository,
    B: BoardRepository,
    M: MemberRepository,
    T: TaskRepository,
    K: ChecklistRepository,
{
    pub fn new(chain: AccessChain<O, P, B, M>, tasks: T, checklists: K) -> Self {
        Self {
            chain,
            tasks,
            checklists,
        }
    }

    /// Oldest first.
    pub async fn list(&self, user_id: Uuid, task_id: Uuid) -> PlanhubResult<Vec<Checklist>> {
        let (task, _) = self.require_task(task_id, user_id).await?;
        self.checklists.find_by_task(task.id).await
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        mut input: CreateChecklist,
    ) -> PlanhubResult<Checklist> {
        let (task, member) = self.require_task(input.task_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "add checklist item")?;

        input.task_id = task.id;
        self.checklists.create(input).await
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        checklist_id: Uuid,
        patch: UpdateChecklist,
    ) -> PlanhubResult<Checklist> {
        let (task, member) = self.require_task(task_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "update checklist item")?;

        let mut checklist = self
            .checklists
            .find_by_task_and_id(task.id, checklist_id)
            .await?
            .ok_or_else(|| PlanhubError::not_found("checklist", checklist_id))?;

        if let Some(title) = patch.title {
            checklist.title = title;
        }
        if let Some(is_completed) = patch.is_completed
            && is_completed != checklist.is_completed
        {
            checklist.is_completed = is_completed;
            checklist.completed_at = is_completed.then(Utc::now);
        }

        self.checklists.save(checklist).await
    }

    pub async fn delete(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        checklist_id: Uuid,
    ) -> PlanhubResult<()> {
        let (task, member) = self.require_task(task_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "delete checklist item")?;

        let checklist = self
            .checklists
            .find_by_task_and_id(task.id, checklist_id)
            .await?
            .ok_or_else(|| PlanhubError::not_found("checklist", checklist_id))?;

        self.checklists.delete(checklist.id).await
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
