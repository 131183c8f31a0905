//! In-memory storage implementation

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::storage::{Filter, Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Thread-safe in-memory storage implementation
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    entities: RwLock<HashMap<String, E>>,
}

impl<E> Default for InMemoryStorage<E>
where
    E: StorageEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStorage<E>
where
    E: StorageEntity,
{
    /// Creates a new empty in-memory storage
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }

    fn read_lock_error(e: impl std::fmt::Display) -> DomainError {
        DomainError::storage(format!("Failed to acquire read lock: {}", e))
    }

    fn write_lock_error(e: impl std::fmt::Display) -> DomainError {
        DomainError::storage(format!("Failed to acquire write lock: {}", e))
    }
}

fn in_creation_order<E: StorageEntity>(mut entities: Vec<E>) -> Vec<E> {
    entities.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.key().as_str().cmp(b.key().as_str()))
    });
    entities
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        let entities = self.entities.read().map_err(Self::read_lock_error)?;

        Ok(entities.get(key.as_str()).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let entities = self.entities.read().map_err(Self::read_lock_error)?;

        Ok(in_creation_order(entities.values().cloned().collect()))
    }

    async fn find(&self, filter: Filter<'_, E>) -> Result<Vec<E>, DomainError> {
        let entities = self.entities.read().map_err(Self::read_lock_error)?;

        Ok(in_creation_order(
            entities.values().filter(|e| filter(e)).cloned().collect(),
        ))
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.entities.write().map_err(Self::write_lock_error)?;

        if entities.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Entity with key '{}' already exists",
                key
            )));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.entities.write().map_err(Self::write_lock_error)?;

        if !entities.contains_key(&key) {
            return Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                key
            )));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        let mut entities = self.entities.write().map_err(Self::write_lock_error)?;

        Ok(entities.remove(key.as_str()).is_some())
    }

    async fn delete_where(&self, filter: Filter<'_, E>) -> Result<usize, DomainError> {
        let mut entities = self.entities.write().map_err(Self::write_lock_error)?;
        let before = entities.len();

        entities.retain(|_, e| !filter(e));
        Ok(before - entities.len())
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        let entities = self.entities.read().map_err(Self::read_lock_error)?;

        Ok(entities.contains_key(key.as_str()))
    }

    async fn count_where(&self, filter: Filter<'_, E>) -> Result<usize, DomainError> {
        let entities = self.entities.read().map_err(Self::read_lock_error)?;

        Ok(entities.values().filter(|e| filter(e)).count())
    }
}
