//! Member repository trait

use async_trait::async_trait;

use super::entity::Member;
use crate::domain::contact::Email;
use crate::domain::ids::{MemberId, TeamId};
use crate::domain::DomainError;

/// Repository for team members
#[async_trait]
pub trait MemberRepository: Send + Sync + std::fmt::Debug {
    /// Get a member by ID
    async fn get(&self, id: &MemberId) -> Result<Option<Member>, DomainError>;

    /// Create a new member
    async fn create(&self, member: Member) -> Result<Member, DomainError>;

    /// Delete a member by ID
    async fn delete(&self, id: &MemberId) -> Result<bool, DomainError>;

    /// Members of a team in join order
    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<Member>, DomainError>;

    /// Current head count of a team
    async fn count_by_team(&self, team_id: &TeamId) -> Result<usize, DomainError>;

    /// Find the member of a team with this email
    async fn find_by_team_and_email(
        &self,
        team_id: &TeamId,
        email: &Email,
    ) -> Result<Option<Member>, DomainError>;

    /// Remove every member of a team
    async fn delete_by_team(&self, team_id: &TeamId) -> Result<usize, DomainError>;
}
