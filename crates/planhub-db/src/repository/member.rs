//! SurrealDB implementation of [`MemberRepository`].

use chrono::{DateTime, Utc};
use planhub_core::error::PlanhubResult;
use planhub_core::models::member::{
    CreateMember, OrganizationMember, OrganizationRole,
};
use planhub_core::repository::MemberRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct MemberRow {
    organization_id: String,
    user_id: String,
    role: String,
    joined_at: DateTime<Utc>,
    invited_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct MemberRowWithId {
    record_id: String,
    organization_id: String,
    user_id: String,
    role: String,
    joined_at: DateTime<Utc>,
    invited_by: Option<String>,
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

impl MemberRow {
    fn try_into_member(self, id: Uuid) -> Result<OrganizationMember, DbError> {
        Ok(OrganizationMember {
            id,
            organization_id: parse_uuid("organization_id", &self.organization_id)?,
            user_id: parse_uuid("user_id", &self.user_id)?,
            role: OrganizationRole::parse(&self.role)
                .map_err(|e| DbError::Query(e.to_string()))?,
            joined_at: self.joined_at,
            invited_by: self
                .invited_by
                .as_deref()
                .map(|v| parse_uuid("invited_by", v))
                .transpose()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl MemberRowWithId {
    fn try_into_member(self) -> Result<OrganizationMember, DbError> {
        let id = parse_uuid("record_id", &self.record_id)?;
        MemberRow {
            organization_id: self.organization_id,
            user_id: self.user_id,
            role: self.role,
            joined_at: self.joined_at,
            invited_by: self.invited_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_member(id)
    }
}

/// SurrealDB implementation of the organization membership repository.
#[derive(Clone)]
pub struct SurrealMemberRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMemberRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MemberRepository for SurrealMemberRepository<C> {
    async fn create(&self, input: CreateMember) -> PlanhubResult<OrganizationMember> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('organization_member', $id) SET \
                 organization_id = $organization_id, user_id = $user_id, \
                 role = $role, invited_by = $invited_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("invited_by", input.invited_by.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization_member".into(),
            id: id_str,
        })?;

        Ok(row.try_into_member(id)?)
    }

    async fn find(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> PlanhubResult<Option<OrganizationMember>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization_member \
                 WHERE organization_id = $organization_id AND user_id = $user_id",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRowWithId> = result.take(0).map_err(DbError::from)?;
        let member = rows
            .into_iter()
            .next()
            .map(MemberRowWithId::try_into_member)
            .transpose()?;

        Ok(member)
    }

    async fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> PlanhubResult<Vec<OrganizationMember>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization_member \
                 WHERE organization_id = $organization_id ORDER BY joined_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRowWithId> = result.take(0).map_err(DbError::from)?;
        let members = rows
            .into_iter()
            .map(MemberRowWithId::try_into_member)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(members)
    }

    async fn list_by_user(&self, user_id: Uuid) -> PlanhubResult<Vec<OrganizationMember>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization_member \
                 WHERE user_id = $user_id ORDER BY joined_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRowWithId> = result.take(0).map_err(DbError::from)?;
        let members = rows
            .into_iter()
            .map(MemberRowWithId::try_into_member)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(members)
    }

    async fn count_by_organization(&self, organization_id: Uuid) -> PlanhubResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM organization_member \
                 WHERE organization_id = $organization_id GROUP ALL",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(|r| r.total).unwrap_or(0))
    }

    async fn count_owners(&self, organization_id: Uuid) -> PlanhubResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM organization_member \
                 WHERE organization_id = $organization_id AND role = 'Owner' \
                 GROUP ALL",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(|r| r.total).unwrap_or(0))
    }

    async fn update_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: OrganizationRole,
    ) -> PlanhubResult<OrganizationMember> {
        let result = self
            .db
            .query(
                "UPDATE organization_member \
                 SET role = $role, updated_at = time::now() \
                 WHERE organization_id = $organization_id AND user_id = $user_id",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .bind(("role", role.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from_check)?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization_member \
                 WHERE organization_id = $organization_id AND user_id = $user_id",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization_member".into(),
            id: format!("org={organization_id} user={user_id}"),
        })?;

        Ok(row.try_into_member()?)
    }

    async fn delete(&self, organization_id: Uuid, user_id: Uuid) -> PlanhubResult<()> {
        self.db
            .query(
                "DELETE organization_member \
                 WHERE organization_id = $organization_id AND user_id = $user_id",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }
}
