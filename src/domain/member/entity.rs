//! Member entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_member_name, validate_role, MemberValidationError};
use crate::domain::contact::{Email, PhoneNumber};
use crate::domain::ids::{MemberId, TeamId};
use crate::domain::storage::StorageEntity;

/// A person registered on exactly one team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    team_id: TeamId,
    name: String,
    email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<PhoneNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    created_at: DateTime<Utc>,
}

impl Member {
    /// Create a new member of `team_id`
    pub fn new(
        team_id: TeamId,
        name: impl Into<String>,
        email: Email,
        phone: Option<PhoneNumber>,
        role: Option<String>,
    ) -> Result<Self, MemberValidationError> {
        let name = name.into().trim().to_string();
        validate_member_name(&name)?;
        let role = role.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        validate_role(role.as_deref())?;

        Ok(Self {
            id: MemberId::generate(),
            team_id,
            name,
            email,
            phone,
            role,
            created_at: Utc::now(),
        })
    }

    /// Rebuild a member from persisted fields
    pub fn restore(
        id: MemberId,
        team_id: TeamId,
        name: String,
        email: Email,
        phone: Option<PhoneNumber>,
        role: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            team_id,
            name,
            email,
            phone,
            role,
            created_at,
        }
    }

    pub fn id(&self) -> &MemberId {
        &self.id
    }

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl StorageEntity for Member {
    type Key = MemberId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
