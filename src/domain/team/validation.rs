//! Team validation

use thiserror::Error;

use crate::domain::DomainError;

/// Errors that can occur during team validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamValidationError {
    #[error("Team name cannot be empty")]
    EmptyName,

    #[error("Team name cannot exceed {0} characters")]
    NameTooLong(usize),

    #[error("Leader name cannot be empty")]
    EmptyLeaderName,

    #[error("Leader name cannot exceed {0} characters")]
    LeaderNameTooLong(usize),

    #[error("max_members must be between {min} and {max}")]
    MaxMembersOutOfRange { min: u32, max: u32 },
}

impl From<TeamValidationError> for DomainError {
    fn from(err: TeamValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}

pub const MAX_TEAM_NAME_LENGTH: usize = 100;
pub const MIN_TEAM_SIZE: u32 = 1;
pub const MAX_TEAM_SIZE: u32 = 20;
pub const DEFAULT_TEAM_SIZE: u32 = 5;

/// Validate a team name
pub fn validate_team_name(name: &str) -> Result<(), TeamValidationError> {
    if name.trim().is_empty() {
        return Err(TeamValidationError::EmptyName);
    }

    if name.chars().count() > MAX_TEAM_NAME_LENGTH {
        return Err(TeamValidationError::NameTooLong(MAX_TEAM_NAME_LENGTH));
    }

    Ok(())
}

/// Validate the leader's display name
pub fn validate_leader_name(name: &str) -> Result<(), TeamValidationError> {
    if name.trim().is_empty() {
        return Err(TeamValidationError::EmptyLeaderName);
    }

    if name.chars().count() > MAX_TEAM_NAME_LENGTH {
        return Err(TeamValidationError::LeaderNameTooLong(MAX_TEAM_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a team capacity
pub fn validate_max_members(max_members: u32) -> Result<(), TeamValidationError> {
    if !(MIN_TEAM_SIZE..=MAX_TEAM_SIZE).contains(&max_members) {
        return Err(TeamValidationError::MaxMembersOutOfRange {
            min: MIN_TEAM_SIZE,
            max: MAX_TEAM_SIZE,
        });
    }

    Ok(())
}
