//! Team entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    validate_leader_name, validate_max_members, validate_team_name, TeamValidationError,
};
use crate::domain::contact::Email;
use crate::domain::ids::TeamId;
use crate::domain::storage::StorageEntity;

/// A hackathon team with a fixed member capacity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: String,
    leader_name: String,
    leader_email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    max_members: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Team {
    /// Create a new team
    pub fn new(
        name: impl Into<String>,
        leader_name: impl Into<String>,
        leader_email: Email,
        max_members: u32,
    ) -> Result<Self, TeamValidationError> {
        let name = name.into().trim().to_string();
        let leader_name = leader_name.into().trim().to_string();
        validate_team_name(&name)?;
        validate_leader_name(&leader_name)?;
        validate_max_members(max_members)?;
        let now = Utc::now();

        Ok(Self {
            id: TeamId::generate(),
            name,
            leader_name,
            leader_email,
            description: None,
            max_members,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a team from persisted fields
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: TeamId,
        name: String,
        leader_name: String,
        leader_email: Email,
        description: Option<String>,
        max_members: u32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            leader_name,
            leader_email,
            description,
            max_members,
            created_at,
            updated_at,
        }
    }

    /// Set description (builder pattern)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    // Getters

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn leader_name(&self) -> &str {
        &self.leader_name
    }

    pub fn leader_email(&self) -> &Email {
        &self.leader_email
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn max_members(&self) -> u32 {
        self.max_members
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether one more member fits given the current head count
    pub fn has_room_for_one_more(&self, current_members: usize) -> bool {
        current_members < self.max_members as usize
    }

    // Mutators

    /// Update the name
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), TeamValidationError> {
        let name = name.into().trim().to_string();
        validate_team_name(&name)?;
        self.name = name;
        self.touch();
        Ok(())
    }

    /// Update the description
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    /// Update the capacity
    pub fn set_max_members(&mut self, max_members: u32) -> Result<(), TeamValidationError> {
        validate_max_members(max_members)?;
        self.max_members = max_members;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Team {
    type Key = TeamId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
