//! Organization membership and the role hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PlanhubError, PlanhubResult};

/// Role of a member within an organization.
///
/// Variants are declared in ascending rank so the derived `Ord` gives
/// `Viewer < Member < Admin < Owner`; permission checks compare roles
/// directly instead of matching on strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrganizationRole {
    Viewer,
    Member,
    Admin,
    Owner,
}

impl OrganizationRole {
    /// Numeric rank: Owner(3) > Admin(2) > Member(1) > Viewer(0).
    pub fn level(self) -> u8 {
        match self {
            Self::Viewer => 0,
            Self::Member => 1,
            Self::Admin => 2,
            Self::Owner => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "Viewer",
            Self::Member => "Member",
            Self::Admin => "Admin",
            Self::Owner => "Owner",
        }
    }

    /// Case-insensitive parse, e.g. from an invite request.
    pub fn parse(s: &str) -> PlanhubResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "viewer" => Ok(Self::Viewer),
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            other => Err(PlanhubError::Validation {
                message: format!("Invalid role: {other}"),
            }),
        }
    }
}

/// The (organization, user) membership record gating all access.
///
/// The (organization_id, user_id) pair is unique at the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationMember {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: OrganizationRole,
    pub joined_at: DateTime<Utc>,
    /// The member who issued the invite, if any.
    pub invited_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMember {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: OrganizationRole,
    pub invited_by: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_totally_ordered() {
        assert!(OrganizationRole::Owner > OrganizationRole::Admin);
        assert!(OrganizationRole::Admin > OrganizationRole::Member);
        assert!(OrganizationRole::Member > OrganizationRole::Viewer);
        assert!(OrganizationRole::Admin >= OrganizationRole::Admin);
    }

    #[test]
    fn role_levels_match_ordering() {
        let mut roles = [
            OrganizationRole::Owner,
            OrganizationRole::Viewer,
            OrganizationRole::Admin,
            OrganizationRole::Member,
        ];
        roles.sort();
        let levels: Vec<u8> = roles.iter().map(|r| r.level()).collect();
        assert_eq!(levels, vec![0, 1, 2, 3]);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            OrganizationRole::parse("ADMIN").unwrap(),
            OrganizationRole::Admin
        );
        assert_eq!(
            OrganizationRole::parse("owner").unwrap(),
            OrganizationRole::Owner
        );
        assert!(OrganizationRole::parse("superuser").is_err());
    }
}
