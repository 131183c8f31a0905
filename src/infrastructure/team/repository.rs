//! Storage-backed team repository implementation

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::contact::Email;
use crate::domain::ids::TeamId;
use crate::domain::storage::{Filter, Storage};
use crate::domain::team::{Team, TeamQuery, TeamRepository};
use crate::domain::DomainError;

/// Storage-backed implementation of TeamRepository
#[derive(Debug)]
pub struct StorageTeamRepository {
    storage: Arc<dyn Storage<Team>>,
}

impl StorageTeamRepository {
    /// Create a new storage-backed repository
    pub fn new(storage: Arc<dyn Storage<Team>>) -> Self {
        Self { storage }
    }

    async fn first_where(
        &self,
        filter: Filter<'_, Team>,
    ) -> Result<Option<Team>, DomainError> {
        Ok(self.storage.find(filter).await?.into_iter().next())
    }
}

#[async_trait]
impl TeamRepository for StorageTeamRepository {
    async fn get(&self, id: &TeamId) -> Result<Option<Team>, DomainError> {
        self.storage.get(id).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, DomainError> {
        self.first_where(&|team: &Team| team.name() == name).await
    }

    async fn find_by_leader_email(&self, email: &Email) -> Result<Option<Team>, DomainError> {
        self.first_where(&|team: &Team| team.leader_email() == email)
            .await
    }

    async fn create(&self, team: Team) -> Result<Team, DomainError> {
        if self.storage.exists(team.id()).await? {
            return Err(DomainError::conflict(format!(
                "Team '{}' already exists",
                team.id()
            )));
        }

        self.storage.create(team).await
    }

    async fn update(&self, team: Team) -> Result<Team, DomainError> {
        if !self.storage.exists(team.id()).await? {
            return Err(DomainError::not_found("Team not found"));
        }

        self.storage.update(team).await
    }

    async fn delete(&self, id: &TeamId) -> Result<bool, DomainError> {
        self.storage.delete(id).await
    }

    async fn list(&self, query: &TeamQuery) -> Result<Vec<Team>, DomainError> {
        let teams = self.storage.list().await?;

        Ok(teams
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .collect())
    }
}
