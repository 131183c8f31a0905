//! Invitation repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entity::{Invitation, InvitationToken};
use crate::domain::contact::Email;
use crate::domain::ids::TeamId;
use crate::domain::member::Member;
use crate::domain::DomainError;

/// Repository for invitations, keyed by token
#[async_trait]
pub trait InvitationRepository: Send + Sync + std::fmt::Debug {
    /// Look up an invitation by its token
    async fn get_by_token(
        &self,
        token: &InvitationToken,
    ) -> Result<Option<Invitation>, DomainError>;

    /// Store a new invitation
    async fn create(&self, invitation: Invitation) -> Result<Invitation, DomainError>;

    /// Persist changes to an existing invitation (OTP state, verification)
    async fn update(&self, invitation: Invitation) -> Result<Invitation, DomainError>;

    /// Invitations of a team in creation order
    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<Invitation>, DomainError>;

    /// The unused, unexpired invitation for this email, if any
    async fn find_active(
        &self,
        team_id: &TeamId,
        email: &Email,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>, DomainError>;

    /// Remove every invitation of a team
    async fn delete_by_team(&self, team_id: &TeamId) -> Result<usize, DomainError>;

    /// Insert `member` and mark the invitation used as one unit.
    ///
    /// Fails with an invalid-state error if the invitation was consumed
    /// in the meantime, or with a conflict if the member's team already
    /// holds `max_members`; in either case nothing is written.
    async fn redeem(
        &self,
        token: &InvitationToken,
        member: Member,
        max_members: u32,
    ) -> Result<Member, DomainError>;
}
