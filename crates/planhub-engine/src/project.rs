//! Project and tag service.

use planhub_core::error::{PlanhubError, PlanhubResult};
use planhub_core::models::member::{OrganizationMember, OrganizationRole};
use planhub_core::models::project::{CreateProject, Project, UpdateProject};
use planhub_core::models::tag::{CreateTag, Tag};
use planhub_core::repository::{
    MemberRepository, OrganizationRepository, ProjectRepository, TagRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::access::require_role;

#[derive(Clone)]
pub struct ProjectService<O, P, M, G> {
    organizations: O,
    projects: P,
    members: M,
    tags: G,
}

impl<O, P, M, G> ProjectService<O, P, M, G>
where
    O: OrganizationRepository,
    P: ProjectRepository,
    M: MemberRepository,
    G: TagRepository,
{
    pub fn new(organizations: O, projects: P, members: M, tags: G) -> Self {
        Self {
            organizations,
            projects,
            members,
            tags,
        }
    }

    pub async fn create(&self, user_id: Uuid, input: CreateProject) -> PlanhubResult<Project> {
        self.organizations.get_by_id(input.organization_id).await?;
        let member = self.membership(input.organization_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "create project")?;

        let project = self.projects.create(input).await?;
        info!(project_id = %project.id, "Project created");
        Ok(project)
    }

    pub async fn get(&self, project_id: Uuid, user_id: Uuid) -> PlanhubResult<Project> {
        let project = self.projects.get_by_id(project_id).await?;
        self.membership(project.organization_id, user_id).await?;
        Ok(project)
    }

    /// Every project in every organization the user belongs to.
    pub async fn list_for_user(&self, user_id: Uuid) -> PlanhubResult<Vec<Project>> {
        let memberships = self.members.list_by_user(user_id).await?;
        let mut projects = Vec::new();
        for membership in memberships {
            projects.extend(
                self.projects
                    .list_by_organization(membership.organization_id)
                    .await?,
            );
        }
        Ok(projects)
    }

    pub async fn update(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        input: UpdateProject,
    ) -> PlanhubResult<Project> {
        let project = self.projects.get_by_id(project_id).await?;
        let member = self.membership(project.organization_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "update project")?;

        self.projects.update(project_id, input).await
    }

    /// Admin and up. Cascades to boards, statuses, tasks, and tags.
    pub async fn delete(&self, project_id: Uuid, user_id: Uuid) -> PlanhubResult<()> {
        let project = self.projects.get_by_id(project_id).await?;
        let member = self.membership(project.organization_id, user_id).await?;
        require_role(&member, OrganizationRole::Admin, "delete project")?;

        self.projects.delete(project_id).await?;
        info!(project_id = %project_id, "Project deleted");
        Ok(())
    }

    pub async fn list_tags(&self, project_id: Uuid, user_id: Uuid) -> PlanhubResult<Vec<Tag>> {
        let project = self.projects.get_by_id(project_id).await?;
        self.membership(project.organization_id, user_id).await?;
        self.tags.find_by_project(project_id).await
    }

    pub async fn create_tag(&self, user_id: Uuid, input: CreateTag) -> PlanhubResult<Tag> {
        let project = self.projects.get_by_id(input.project_id).await?;
        let member = self.membership(project.organization_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "create tag")?;

        if self
            .tags
            .find_by_project_and_name(input.project_id, &input.name)
            .await?
            .is_some()
        {
            return Err(PlanhubError::AlreadyExists {
                entity: "tag".into(),
                field: "name".into(),
                value: input.name,
            });
        }

        self.tags.create(input).await
    }

    /// Detaches the tag from every task, then removes it.
    pub async fn delete_tag(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        tag_id: Uuid,
    ) -> PlanhubResult<()> {
        let project = self.projects.get_by_id(project_id).await?;
        let member = self.membership(project.organization_id, user_id).await?;
        require_role(&member, OrganizationRole::Member, "delete tag")?;

        let tag = self.tags.get_by_id(tag_id).await?;
        if tag.project_id != project_id {
            return Err(PlanhubError::access_denied(
                "Tag does not belong to this project",
            ));
        }

        self.tags.delete(tag_id).await
    }

    async fn membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> PlanhubResult<OrganizationMember> {
        self.members
            .find(organization_id, user_id)
            .await?
            .ok_or_else(|| {
                PlanhubError::access_denied("Not a member of this organization")
            })
    }
}
