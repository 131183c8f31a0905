//! Storage-backed member repository implementation

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::contact::Email;
use crate::domain::ids::{MemberId, TeamId};
use crate::domain::member::{Member, MemberRepository};
use crate::domain::storage::Storage;
use crate::domain::DomainError;

/// Storage-backed implementation of MemberRepository
#[derive(Debug)]
pub struct StorageMemberRepository {
    storage: Arc<dyn Storage<Member>>,
}

impl StorageMemberRepository {
    pub fn new(storage: Arc<dyn Storage<Member>>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl MemberRepository for StorageMemberRepository {
    async fn get(&self, id: &MemberId) -> Result<Option<Member>, DomainError> {
        self.storage.get(id).await
    }

    async fn create(&self, member: Member) -> Result<Member, DomainError> {
        self.storage.create(member).await
    }

    async fn delete(&self, id: &MemberId) -> Result<bool, DomainError> {
        self.storage.delete(id).await
    }

    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<Member>, DomainError> {
        self.storage
            .find(&|member: &Member| member.team_id() == team_id)
            .await
    }

    async fn count_by_team(&self, team_id: &TeamId) -> Result<usize, DomainError> {
        self.storage
            .count_where(&|member: &Member| member.team_id() == team_id)
            .await
    }

    async fn find_by_team_and_email(
        &self,
        team_id: &TeamId,
        email: &Email,
    ) -> Result<Option<Member>, DomainError> {
        let matches = self
            .storage
            .find(&|member: &Member| member.team_id() == team_id && member.email() == email)
            .await?;

        Ok(matches.into_iter().next())
    }

    async fn delete_by_team(&self, team_id: &TeamId) -> Result<usize, DomainError> {
        self.storage
            .delete_where(&|member: &Member| member.team_id() == team_id)
            .await
    }
}
