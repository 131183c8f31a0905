//! Storage trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

use super::entity::StorageEntity;

/// Predicate used by filtered storage operations
pub type Filter<'a, E> = &'a (dyn Fn(&E) -> bool + Send + Sync);

/// Generic storage trait for CRUD operations on any entity type
#[async_trait]
pub trait Storage<E>: Send + Sync + Debug
where
    E: StorageEntity + 'static,
{
    /// Retrieves an entity by its key
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    /// Retrieves all entities, oldest first
    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Retrieves the entities matching a predicate, oldest first
    async fn find(&self, filter: Filter<'_, E>) -> Result<Vec<E>, DomainError> {
        Ok(self.list().await?.into_iter().filter(|e| filter(e)).collect())
    }

    /// Creates a new entity, returns error if already exists
    async fn create(&self, entity: E) -> Result<E, DomainError>;

    /// Updates an existing entity, returns error if not found
    async fn update(&self, entity: E) -> Result<E, DomainError>;

    /// Deletes an entity by its key, returns true if deleted
    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError>;

    /// Deletes every entity matching a predicate, returns how many were removed
    async fn delete_where(&self, filter: Filter<'_, E>) -> Result<usize, DomainError>;

    /// Checks if an entity exists by its key
    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Returns the count of entities matching a predicate
    async fn count_where(&self, filter: Filter<'_, E>) -> Result<usize, DomainError> {
        Ok(self.find(filter).await?.len())
    }
}
