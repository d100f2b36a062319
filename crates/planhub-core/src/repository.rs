//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups that feed access checks
//! (`MemberRepository::find`) return `Option` so that "no membership" is
//! distinguishable from a storage failure. Cascade behavior noted on a
//! method is the implementation's responsibility and must be atomic.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::PlanhubResult;
use crate::models::{
    board::{Board, CreateBoard, UpdateBoard},
    checklist::{Checklist, CreateChecklist},
    comment::{CreateComment, TaskComment},
    member::{CreateMember, OrganizationMember, OrganizationRole},
    organization::{CreateOrganization, Organization, UpdateOrganization},
    project::{CreateProject, Project, UpdateProject},
    status::{CreateTaskStatus, StatusOrder, TaskStatus},
    tag::{CreateTag, Tag},
    task::{CreateTask, Task},
    user::{CreateUser, User},
};

// ---------------------------------------------------------------------------
// Identity & directory
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = PlanhubResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PlanhubResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = PlanhubResult<User>> + Send;
}

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = PlanhubResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PlanhubResult<Organization>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> impl Future<Output = PlanhubResult<Organization>> + Send;
    /// Cascade: removes members, projects, and the full subtree below them.
    fn delete(&self, id: Uuid) -> impl Future<Output = PlanhubResult<()>> + Send;
}

pub trait MemberRepository: Send + Sync {
    fn create(
        &self,
        input: CreateMember,
    ) -> impl Future<Output = PlanhubResult<OrganizationMember>> + Send;

    /// The access gate: `None` means the user has no membership in the
    /// organization.
    fn find(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Option<OrganizationMember>>> + Send;

    fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Vec<OrganizationMember>>> + Send;

    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Vec<OrganizationMember>>> + Send;

    fn count_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<u64>> + Send;

    /// Number of members holding the Owner role; used by the last-owner
    /// guard on role changes and removals.
    fn count_owners(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<u64>> + Send;

    fn update_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: OrganizationRole,
    ) -> impl Future<Output = PlanhubResult<OrganizationMember>> + Send;

    fn delete(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<()>> + Send;
}

pub trait ProjectRepository: Send + Sync {
    fn create(&self, input: CreateProject) -> impl Future<Output = PlanhubResult<Project>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PlanhubResult<Project>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateProject,
    ) -> impl Future<Output = PlanhubResult<Project>> + Send;
    /// Cascade: removes boards, statuses, tasks, tags, and task children.
    fn delete(&self, id: Uuid) -> impl Future<Output = PlanhubResult<()>> + Send;
    fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Vec<Project>>> + Send;
}

pub trait BoardRepository: Send + Sync {
    fn create(&self, input: CreateBoard) -> impl Future<Output = PlanhubResult<Board>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PlanhubResult<Board>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateBoard,
    ) -> impl Future<Output = PlanhubResult<Board>> + Send;
    /// Cascade: removes statuses, tasks, and task children.
    fn delete(&self, id: Uuid) -> impl Future<Output = PlanhubResult<()>> + Send;
    fn list_by_project(
        &self,
        project_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Vec<Board>>> + Send;
}

// ---------------------------------------------------------------------------
// Status engine contracts
// ---------------------------------------------------------------------------

pub trait StatusRepository: Send + Sync {
    /// Unique-index collisions on (board, name) or (board, order_index)
    /// surface as a Validation error.
    fn create(
        &self,
        input: CreateTaskStatus,
    ) -> impl Future<Output = PlanhubResult<TaskStatus>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PlanhubResult<TaskStatus>> + Send;

    /// All statuses of a board, ordered by `order_index` ascending.
    fn find_by_board(
        &self,
        board_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Vec<TaskStatus>>> + Send;

    fn find_by_board_and_name(
        &self,
        board_id: Uuid,
        name: &str,
    ) -> impl Future<Output = PlanhubResult<Option<TaskStatus>>> + Send;

    fn find_by_board_and_order_index(
        &self,
        board_id: Uuid,
        order_index: i64,
    ) -> impl Future<Output = PlanhubResult<Option<TaskStatus>>> + Send;

    /// Persists all mutable fields of the status. Unique-index collisions
    /// surface as a Validation error.
    fn save(&self, status: TaskStatus) -> impl Future<Output = PlanhubResult<TaskStatus>> + Send;

    /// Makes `status_id` the board's sole final status. The demotion of
    /// every other final status and the completion rewrite of the affected
    /// tasks (demoted statuses' tasks become not-completed, the promoted
    /// status's tasks become completed at `now`, existing completion
    /// timestamps untouched) run in one all-or-nothing transaction.
    /// Returns the statuses that were demoted.
    fn promote(
        &self,
        board_id: Uuid,
        status_id: Uuid,
        now: DateTime<Utc>,
    ) -> impl Future<Output = PlanhubResult<Vec<TaskStatus>>> + Send;

    /// Applies a bulk reorder in one all-or-nothing transaction. Callers
    /// must have validated board ownership and target-index uniqueness;
    /// the write uses a two-phase shift so the (board, order_index)
    /// unique index never observes a transient collision.
    fn apply_order(
        &self,
        board_id: Uuid,
        entries: Vec<StatusOrder>,
    ) -> impl Future<Output = PlanhubResult<()>> + Send;

    /// Plain delete; the engine rejects deletion of statuses that still
    /// hold tasks before this is ever attempted.
    fn delete(&self, id: Uuid) -> impl Future<Output = PlanhubResult<()>> + Send;
}

pub trait TaskRepository: Send + Sync {
    fn create(&self, input: CreateTask) -> impl Future<Output = PlanhubResult<Task>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PlanhubResult<Task>> + Send;
    fn find_by_board(
        &self,
        board_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Vec<Task>>> + Send;
    fn find_by_status(
        &self,
        status_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Vec<Task>>> + Send;
    /// Referential guard input for status deletion.
    fn count_by_status(
        &self,
        status_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<u64>> + Send;
    /// Persists all mutable fields of the task, including the derived
    /// completion pair.
    fn save(&self, task: Task) -> impl Future<Output = PlanhubResult<Task>> + Send;
    /// Cascade: removes checklists, comments, and tag edges.
    fn delete(&self, id: Uuid) -> impl Future<Output = PlanhubResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Task sub-resources
// ---------------------------------------------------------------------------

pub trait ChecklistRepository: Send + Sync {
    fn create(
        &self,
        input: CreateChecklist,
    ) -> impl Future<Output = PlanhubResult<Checklist>> + Send;
    /// Ordered by creation time ascending.
    fn find_by_task(
        &self,
        task_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Vec<Checklist>>> + Send;
    /// Scoped lookup: `None` when the id exists but belongs to another task.
    fn find_by_task_and_id(
        &self,
        task_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Option<Checklist>>> + Send;
    fn save(
        &self,
        checklist: Checklist,
    ) -> impl Future<Output = PlanhubResult<Checklist>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = PlanhubResult<()>> + Send;
}

pub trait CommentRepository: Send + Sync {
    fn create(
        &self,
        input: CreateComment,
    ) -> impl Future<Output = PlanhubResult<TaskComment>> + Send;
    /// Ordered by creation time descending (newest first).
    fn find_by_task(
        &self,
        task_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Vec<TaskComment>>> + Send;
    fn find_by_task_and_id(
        &self,
        task_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Option<TaskComment>>> + Send;
    fn save(
        &self,
        comment: TaskComment,
    ) -> impl Future<Output = PlanhubResult<TaskComment>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = PlanhubResult<()>> + Send;
}

pub trait TagRepository: Send + Sync {
    /// Unique-index collisions on (project, name) surface as a Validation
    /// error.
    fn create(&self, input: CreateTag) -> impl Future<Output = PlanhubResult<Tag>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PlanhubResult<Tag>> + Send;
    fn find_by_project(
        &self,
        project_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Vec<Tag>>> + Send;
    fn find_by_project_and_name(
        &self,
        project_id: Uuid,
        name: &str,
    ) -> impl Future<Output = PlanhubResult<Option<Tag>>> + Send;
    /// Cascade: removes the tag's edges to all tasks.
    fn delete(&self, id: Uuid) -> impl Future<Output = PlanhubResult<()>> + Send;

    /// Creates a `tagged` edge. Attaching twice is a no-op.
    fn attach_to_task(
        &self,
        task_id: Uuid,
        tag_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<()>> + Send;
    fn detach_from_task(
        &self,
        task_id: Uuid,
        tag_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<()>> + Send;
    fn find_by_task(
        &self,
        task_id: Uuid,
    ) -> impl Future<Output = PlanhubResult<Vec<Tag>>> + Send;
}
