//! Organization directory and membership service.
//!
//! Membership mutations carry two guards beyond the role floor: touching
//! an Owner or Admin membership (granting either role, or changing/
//! removing someone who holds one) requires the caller to be an Owner,
//! and the last Owner of an organization can neither be demoted nor
//! removed.

use planhub_core::error::{PlanhubError, PlanhubResult};
use planhub_core::models::member::{CreateMember, OrganizationMember, OrganizationRole};
use planhub_core::models::organization::{
    CreateOrganization, Organization, UpdateOrganization,
};
use planhub_core::repository::{
    MemberRepository, OrganizationRepository, UserRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::access::require_role;

#[derive(Clone)]
pub struct OrganizationService<O, M, U> {
    organizations: O,
    members: M,
    users: U,
}

impl<O, M, U> OrganizationService<O, M, U>
where
    O: OrganizationRepository,
    M: MemberRepository,
    U: UserRepository,
{
    pub fn new(organizations: O, members: M, users: U) -> Self {
        Self {
            organizations,
            members,
            users,
        }
    }

    /// Creates an organization; the creator becomes its first Owner.
    pub async fn create(
        &self,
        user_id: Uuid,
        input: CreateOrganization,
    ) -> PlanhubResult<Organization> {
        self.users.get_by_id(user_id).await?;

        let organization = self.organizations.create(input).await?;
        self.members
            .create(CreateMember {
                organization_id: organization.id,
                user_id,
                role: OrganizationRole::Owner,
                invited_by: None,
            })
            .await?;

        info!(organization_id = %organization.id, owner_id = %user_id, "Organization created");
        Ok(organization)
    }

    pub async fn get(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> PlanhubResult<(Organization, OrganizationRole)> {
        let organization = self.organizations.get_by_id(organization_id).await?;
        let member = self.membership(organization_id, user_id).await?;
        Ok((organization, member.role))
    }

    /// Every organization the user belongs to, with their role in each.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> PlanhubResult<Vec<(Organization, OrganizationRole)>> {
        let memberships = self.members.list_by_user(user_id).await?;
        let mut organizations = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let organization = self
                .organizations
                .get_by_id(membership.organization_id)
                .await?;
            organizations.push((organization, membership.role));
        }
        Ok(organizations)
    }

    pub async fn update(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        input: UpdateOrganization,
    ) -> PlanhubResult<Organization> {
        self.organizations.get_by_id(organization_id).await?;
        let member = self.membership(organization_id, user_id).await?;
        require_role(&member, OrganizationRole::Admin, "update organization")?;

        self.organizations.update(organization_id, input).await
    }

    /// Owner-only. Cascades to the entire subtree.
    pub async fn delete(&self, organization_id: Uuid, user_id: Uuid) -> PlanhubResult<()> {
        self.organizations.get_by_id(organization_id).await?;
        let member = self.membership(organization_id, user_id).await?;
        require_role(&member, OrganizationRole::Owner, "delete organization")?;

        self.organizations.delete(organization_id).await?;
        info!(organization_id = %organization_id, "Organization deleted");
        Ok(())
    }

    pub async fn list_members(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> PlanhubResult<Vec<OrganizationMember>> {
        self.organizations.get_by_id(organization_id).await?;
        self.membership(organization_id, user_id).await?;
        self.members.list_by_organization(organization_id).await
    }

    /// Invites an existing user by email. The role arrives as a string
    /// from the caller and is parsed case-insensitively.
    pub async fn invite_member(
        &self,
        organization_id: Uuid,
        caller_id: Uuid,
        email: &str,
        role: &str,
    ) -> PlanhubResult<OrganizationMember> {
        self.organizations.get_by_id(organization_id).await?;
        let caller = self.membership(organization_id, caller_id).await?;
        require_role(&caller, OrganizationRole::Member, "invite member")?;

        let role = OrganizationRole::parse(role)?;
        if role >= OrganizationRole::Admin {
            require_role(&caller, OrganizationRole::Owner, "grant an elevated role")?;
        }

        let user = self.users.get_by_email(email).await?;
        if self.members.find(organization_id, user.id).await?.is_some() {
            return Err(PlanhubError::AlreadyExists {
                entity: "member".into(),
                field: "email".into(),
                value: email.into(),
            });
        }

        let member = self
            .members
            .create(CreateMember {
                organization_id,
                user_id: user.id,
                role,
                invited_by: Some(caller_id),
            })
            .await?;

        info!(
            organization_id = %organization_id,
            user_id = %user.id,
            role = role.as_str(),
            "Member invited"
        );
        Ok(member)
    }

    pub async fn update_member_role(
        &self,
        organization_id: Uuid,
        caller_id: Uuid,
        target_user_id: Uuid,
        role: &str,
    ) -> PlanhubResult<OrganizationMember> {
        self.organizations.get_by_id(organization_id).await?;
        let caller = self.membership(organization_id, caller_id).await?;
        require_role(&caller, OrganizationRole::Admin, "change member role")?;

        let target = self
            .members
            .find(organization_id, target_user_id)
            .await?
            .ok_or_else(|| PlanhubError::not_found("member", target_user_id))?;

        let role = OrganizationRole::parse(role)?;
        if target.role >= OrganizationRole::Admin || role >= OrganizationRole::Admin {
            require_role(&caller, OrganizationRole::Owner, "change an elevated role")?;
        }
        self.guard_last_owner(&target, role != OrganizationRole::Owner)
            .await?;

        self.members
            .update_role(organization_id, target_user_id, role)
            .await
    }

    /// Removal by an Admin/Owner, or a member leaving on their own.
    pub async fn remove_member(
        &self,
        organization_id: Uuid,
        caller_id: Uuid,
        target_user_id: Uuid,
    ) -> PlanhubResult<()> {
        self.organizations.get_by_id(organization_id).await?;
        let caller = self.membership(organization_id, caller_id).await?;

        let target = self
            .members
            .find(organization_id, target_user_id)
            .await?
            .ok_or_else(|| PlanhubError::not_found("member", target_user_id))?;

        let leaving = caller_id == target_user_id;
        if !leaving {
            require_role(&caller, OrganizationRole::Admin, "remove member")?;
            if target.role >= OrganizationRole::Admin {
                require_role(&caller, OrganizationRole::Owner, "remove an elevated member")?;
            }
        }
        self.guard_last_owner(&target, true).await?;

        self.members.delete(organization_id, target_user_id).await?;
        info!(
            organization_id = %organization_id,
            user_id = %target_user_id,
            "Member removed"
        );
        Ok(())
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

    /// Rejects mutations that would leave the organization ownerless.
    async fn guard_last_owner(
        &self,
        target: &OrganizationMember,
        loses_ownership: bool,
    ) -> PlanhubResult<()> {
        if target.role == OrganizationRole::Owner
            && loses_ownership
            && self.members.count_owners(target.organization_id).await? <= 1
        {
            return Err(PlanhubError::BusinessLogic {
                message: "Cannot remove the last owner of an organization".into(),
            });
        }
        Ok(())
    }
}
