//! Storage-backed invitation repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

use crate::domain::contact::Email;
use crate::domain::ids::TeamId;
use crate::domain::invitation::{
    Invitation, InvitationRepository, InvitationStateError, InvitationToken,
};
use crate::domain::member::Member;
use crate::domain::storage::Storage;
use crate::domain::DomainError;
use crate::infrastructure::team::team_full;

/// Storage-backed implementation of InvitationRepository
///
/// Member rows live in their own storage; redemption writes to both while
/// holding `redeem_lock` so two joins on one token cannot both succeed.
#[derive(Debug)]
pub struct StorageInvitationRepository {
    invitations: Arc<dyn Storage<Invitation>>,
    members: Arc<dyn Storage<Member>>,
    redeem_lock: Mutex<()>,
}

impl StorageInvitationRepository {
    pub fn new(invitations: Arc<dyn Storage<Invitation>>, members: Arc<dyn Storage<Member>>) -> Self {
        Self {
            invitations,
            members,
            redeem_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl InvitationRepository for StorageInvitationRepository {
    async fn get_by_token(
        &self,
        token: &InvitationToken,
    ) -> Result<Option<Invitation>, DomainError> {
        self.invitations.get(token).await
    }

    async fn create(&self, invitation: Invitation) -> Result<Invitation, DomainError> {
        self.invitations.create(invitation).await
    }

    /// Consumption is never undone by a stale copy
    async fn update(&self, mut invitation: Invitation) -> Result<Invitation, DomainError> {
        let _guard = self.redeem_lock.lock().await;

        let already_used = self
            .invitations
            .get(invitation.token())
            .await?
            .is_some_and(|current| current.is_used());
        if already_used {
            invitation.mark_used();
        }

        self.invitations.update(invitation).await
    }

    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<Invitation>, DomainError> {
        self.invitations
            .find(&|invitation: &Invitation| invitation.team_id() == team_id)
            .await
    }

    async fn find_active(
        &self,
        team_id: &TeamId,
        email: &Email,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>, DomainError> {
        let active = self
            .invitations
            .find(&|invitation: &Invitation| {
                invitation.team_id() == team_id
                    && invitation.email() == email
                    && invitation.is_active_at(now)
            })
            .await?;

        Ok(active.into_iter().next())
    }

    async fn delete_by_team(&self, team_id: &TeamId) -> Result<usize, DomainError> {
        self.invitations
            .delete_where(&|invitation: &Invitation| invitation.team_id() == team_id)
            .await
    }

    async fn redeem(
        &self,
        token: &InvitationToken,
        member: Member,
        max_members: u32,
    ) -> Result<Member, DomainError> {
        let _guard = self.redeem_lock.lock().await;

        let mut invitation = self
            .invitations
            .get(token)
            .await?
            .ok_or_else(|| DomainError::not_found("Invitation not found"))?;

        if invitation.is_used() {
            return Err(InvitationStateError::AlreadyUsed.into());
        }

        let team_id = member.team_id().clone();
        let current = self
            .members
            .count_where(&|m: &Member| m.team_id() == &team_id)
            .await?;
        if current >= max_members as usize {
            return Err(team_full(max_members));
        }

        let member = self.members.create(member).await?;
        invitation.mark_used();

        if let Err(e) = self.invitations.update(invitation).await {
            if let Err(rollback) = self.members.delete(member.id()).await {
                warn!(member_id = %member.id(), error = %rollback, "Failed to roll back member after redeem error");
            }
            return Err(e);
        }

        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryStorage;
    use chrono::Duration;

    struct Fixture {
        repo: Arc<StorageInvitationRepository>,
        members: Arc<InMemoryStorage<Member>>,
        team_id: TeamId,
    }

    fn fixture() -> Fixture {
        let members = Arc::new(InMemoryStorage::<Member>::new());
        let repo = Arc::new(StorageInvitationRepository::new(
            Arc::new(InMemoryStorage::<Invitation>::new()),
            members.clone(),
        ));

        Fixture {
            repo,
            members,
            team_id: TeamId::generate(),
        }
    }

    fn invitation(team_id: &TeamId, email: &str, token: &str, ttl: Duration) -> Invitation {
        let now = Utc::now();
        Invitation::new(
            team_id.clone(),
            Email::parse(email).unwrap(),
            None,
            InvitationToken::new(token),
            now,
            now + ttl,
        )
    }

    fn joiner(team_id: &TeamId, email: &str) -> Member {
        Member::new(team_id.clone(), "Joiner", Email::parse(email).unwrap(), None, None).unwrap()
    }

    #[tokio::test]
    async fn test_find_active_skips_expired_and_used() {
        let f = fixture();
        let email = Email::parse("guest@example.com").unwrap();

        f.repo
            .create(invitation(&f.team_id, "guest@example.com", "expired", Duration::hours(-1)))
            .await
            .unwrap();
        assert!(f
            .repo
            .find_active(&f.team_id, &email, Utc::now())
            .await
            .unwrap()
            .is_none());

        f.repo
            .create(invitation(&f.team_id, "guest@example.com", "fresh", Duration::hours(48)))
            .await
            .unwrap();
        let active = f
            .repo
            .find_active(&f.team_id, &email, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.token().as_str(), "fresh");

        f.repo
            .redeem(active.token(), joiner(&f.team_id, "guest@example.com"), 5)
            .await
            .unwrap();
        assert!(f
            .repo
            .find_active(&f.team_id, &email, Utc::now())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_redeem_marks_used_and_stores_member() {
        let f = fixture();
        let token = InvitationToken::new("tok");
        f.repo
            .create(invitation(&f.team_id, "guest@example.com", "tok", Duration::hours(1)))
            .await
            .unwrap();

        let member = f
            .repo
            .redeem(&token, joiner(&f.team_id, "guest@example.com"), 5)
            .await
            .unwrap();

        assert!(f.members.exists(member.id()).await.unwrap());
        assert!(f.repo.get_by_token(&token).await.unwrap().unwrap().is_used());
    }

    #[tokio::test]
    async fn test_stale_update_keeps_invitation_used() {
        let f = fixture();
        let token = InvitationToken::new("tok");
        let stale = f
            .repo
            .create(invitation(&f.team_id, "guest@example.com", "tok", Duration::hours(1)))
            .await
            .unwrap();
        f.repo
            .redeem(&token, joiner(&f.team_id, "guest@example.com"), 5)
            .await
            .unwrap();

        let written = f.repo.update(stale).await.unwrap();

        assert!(written.is_used());
        assert!(f.repo.get_by_token(&token).await.unwrap().unwrap().is_used());
    }

    #[tokio::test]
    async fn test_concurrent_redeem_admits_one_member() {
        let f = fixture();
        f.repo
            .create(invitation(&f.team_id, "guest@example.com", "race", Duration::hours(1)))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = f.repo.clone();
            let member = joiner(&f.team_id, "guest@example.com");
            handles.push(tokio::spawn(async move {
                repo.redeem(&InvitationToken::new("race"), member, 5).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert_eq!(e.message(), "This invitation has already been used"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(f.members.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_redeems_respect_capacity() {
        let f = fixture();
        for i in 0..6 {
            f.repo
                .create(invitation(
                    &f.team_id,
                    &format!("guest{}@example.com", i),
                    &format!("tok{}", i),
                    Duration::hours(1),
                ))
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for i in 0..6 {
            let repo = f.repo.clone();
            let member = joiner(&f.team_id, &format!("guest{}@example.com", i));
            handles.push(tokio::spawn(async move {
                repo.redeem(&InvitationToken::new(format!("tok{}", i)), member, 2)
                    .await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert!(matches!(e, DomainError::Conflict { .. }), "{}", e),
            }
        }

        assert_eq!(successes, 2);
        assert_eq!(f.members.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_full_team_leaves_invitation_unused() {
        let f = fixture();
        let token = InvitationToken::new("late");
        f.members
            .create(joiner(&f.team_id, "leader@example.com"))
            .await
            .unwrap();
        f.repo
            .create(invitation(&f.team_id, "guest@example.com", "late", Duration::hours(1)))
            .await
            .unwrap();

        let result = f
            .repo
            .redeem(&token, joiner(&f.team_id, "guest@example.com"), 1)
            .await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert!(!f.repo.get_by_token(&token).await.unwrap().unwrap().is_used());
        assert_eq!(f.members.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_redeem_unknown_token() {
        let f = fixture();

        let result = f
            .repo
            .redeem(&InvitationToken::new("nope"), joiner(&f.team_id, "x@example.com"), 5)
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_by_team() {
        let f = fixture();
        let other = TeamId::generate();
        f.repo
            .create(invitation(&f.team_id, "a@example.com", "a", Duration::hours(1)))
            .await
            .unwrap();
        f.repo
            .create(invitation(&other, "b@example.com", "b", Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(f.repo.delete_by_team(&f.team_id).await.unwrap(), 1);
        assert!(f.repo.list_by_team(&f.team_id).await.unwrap().is_empty());
        assert_eq!(f.repo.list_by_team(&other).await.unwrap().len(), 1);
    }
}
