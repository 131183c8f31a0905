//! Team repository trait

use async_trait::async_trait;

use super::entity::Team;
use crate::domain::contact::Email;
use crate::domain::ids::TeamId;
use crate::domain::DomainError;

/// Default page size when listing teams
pub const DEFAULT_TEAM_PAGE_SIZE: usize = 100;

/// Query parameters for listing teams
#[derive(Debug, Clone)]
pub struct TeamQuery {
    /// Number of teams to skip
    pub skip: usize,
    /// Maximum number of results
    pub limit: usize,
}

impl Default for TeamQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_TEAM_PAGE_SIZE,
        }
    }
}

impl TeamQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Repository for managing teams
#[async_trait]
pub trait TeamRepository: Send + Sync + std::fmt::Debug {
    /// Get a team by ID
    async fn get(&self, id: &TeamId) -> Result<Option<Team>, DomainError>;

    /// Find the team with exactly this name
    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, DomainError>;

    /// Find the team led by this email
    async fn find_by_leader_email(&self, email: &Email) -> Result<Option<Team>, DomainError>;

    /// Create a new team
    async fn create(&self, team: Team) -> Result<Team, DomainError>;

    /// Update an existing team
    async fn update(&self, team: Team) -> Result<Team, DomainError>;

    /// Delete a team by ID
    async fn delete(&self, id: &TeamId) -> Result<bool, DomainError>;

    /// List teams in creation order
    async fn list(&self, query: &TeamQuery) -> Result<Vec<Team>, DomainError>;
}
