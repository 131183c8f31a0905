//! Member validation

use thiserror::Error;

use crate::domain::DomainError;

/// Errors that can occur during member validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MemberValidationError {
    #[error("Member name cannot be empty")]
    EmptyName,

    #[error("Member name cannot exceed {0} characters")]
    NameTooLong(usize),

    #[error("Member role cannot exceed {0} characters")]
    RoleTooLong(usize),
}

impl From<MemberValidationError> for DomainError {
    fn from(err: MemberValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}

const MAX_MEMBER_NAME_LENGTH: usize = 100;
const MAX_ROLE_LENGTH: usize = 100;

/// Validate a member's display name
pub fn validate_member_name(name: &str) -> Result<(), MemberValidationError> {
    if name.trim().is_empty() {
        return Err(MemberValidationError::EmptyName);
    }

    if name.chars().count() > MAX_MEMBER_NAME_LENGTH {
        return Err(MemberValidationError::NameTooLong(MAX_MEMBER_NAME_LENGTH));
    }

    Ok(())
}

/// Validate an optional role such as "Backend Developer"
pub fn validate_role(role: Option<&str>) -> Result<(), MemberValidationError> {
    match role {
        Some(role) if role.chars().count() > MAX_ROLE_LENGTH => {
            Err(MemberValidationError::RoleTooLong(MAX_ROLE_LENGTH))
        }
        _ => Ok(()),
    }
}
