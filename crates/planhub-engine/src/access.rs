//! Access chain resolution.
//!
//! Every scoped operation walks the ownership chain (task/status → board →
//! project → organization) and checks the caller's membership in the owning
//! organization. Lookups run before the membership check, so an unknown id
//! is NotFound while a real entity outside the caller's organizations is
//! AccessDenied; callers can rely on that distinction.

use planhub_core::error::{PlanhubError, PlanhubResult};
use planhub_core::models::board::Board;
use planhub_core::models::member::{OrganizationMember, OrganizationRole};
use planhub_core::models::organization::Organization;
use planhub_core::models::project::Project;
use planhub_core::repository::{
    BoardRepository, MemberRepository, OrganizationRepository, ProjectRepository,
};
use uuid::Uuid;

/// Resolves entities to their owning organization and the caller's
/// membership in it.
#[derive(Clone)]
pub struct AccessChain<O, P, B, M> {
    organizations: O,
    projects: P,
    boards: B,
    members: M,
}

impl<O, P, B, M> AccessChain<O, P, B, M>
where
    O: OrganizationRepository,
    P: ProjectRepository,
    B: BoardRepository,
    M: MemberRepository,
{
    pub fn new(organizations: O, projects: P, boards: B, members: M) -> Self {
        Self {
            organizations,
            projects,
            boards,
            members,
        }
    }

    /// Organization lookup plus membership gate.
    pub async fn require_organization(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> PlanhubResult<(Organization, OrganizationMember)> {
        let organization = self.organizations.get_by_id(organization_id).await?;
        let member = self.membership(organization_id, user_id).await?;
        Ok((organization, member))
    }

    /// Project → organization → membership.
    pub async fn require_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> PlanhubResult<(Project, OrganizationMember)> {
        let project = self.projects.get_by_id(project_id).await?;
        let member = self.membership(project.organization_id, user_id).await?;
        Ok((project, member))
    }

    /// Board → project → organization → membership.
    pub async fn require_board(
        &self,
        board_id: Uuid,
        user_id: Uuid,
    ) -> PlanhubResult<(Board, OrganizationMember)> {
        let board = self.boards.get_by_id(board_id).await?;
        let project = self.projects.get_by_id(board.project_id).await?;
        let member = self.membership(project.organization_id, user_id).await?;
        Ok((board, member))
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

/// Role gate: membership exists but the role is below the floor for the
/// operation.
pub fn require_role(
    member: &OrganizationMember,
    minimum: OrganizationRole,
    operation: &str,
) -> PlanhubResult<()> {
    if member.role >= minimum {
        Ok(())
    } else {
        Err(PlanhubError::InsufficientPermissions {
            operation: operation.into(),
        })
    }
}
