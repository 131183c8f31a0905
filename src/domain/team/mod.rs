//! Team domain module
//!
//! A team is led by one person, has a fixed capacity, and owns its members
//! and the invitations issued for it.

mod entity;
mod repository;
mod validation;

pub use entity::Team;
pub use repository::{TeamQuery, TeamRepository, DEFAULT_TEAM_PAGE_SIZE};
pub use validation::{
    validate_leader_name, validate_max_members, validate_team_name, TeamValidationError,
    DEFAULT_TEAM_SIZE, MAX_TEAM_SIZE, MIN_TEAM_SIZE,
};
