//! Storage factory for runtime backend selection

use std::sync::Arc;

use tracing::info;

use crate::config::StorageSettings;
use crate::domain::invitation::{Invitation, InvitationRepository};
use crate::domain::member::{Member, MemberRepository};
use crate::domain::storage::Storage;
use crate::domain::team::{Team, TeamRepository};
use crate::domain::DomainError;
use crate::infrastructure::invitation::{PostgresInvitationRepository, StorageInvitationRepository};
use crate::infrastructure::member::{PostgresMemberRepository, StorageMemberRepository};
use crate::infrastructure::team::{PostgresTeamRepository, StorageTeamRepository};

use super::in_memory::InMemoryStorage;
use super::migrations::run_storage_migrations;
use super::postgres::PostgresConfig;

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// Process-local maps; data is lost on restart
    InMemory,
    Postgres,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres {
        config: PostgresConfig,
        run_migrations: bool,
    },
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres(config: PostgresConfig) -> Self {
        Self::Postgres {
            config,
            run_migrations: true,
        }
    }

    /// Resolve the configured backend; postgres requires a database URL
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, DomainError> {
        let storage_type = StorageType::from_str(&settings.backend).ok_or_else(|| {
            DomainError::configuration(format!("Unknown storage backend '{}'", settings.backend))
        })?;

        match storage_type {
            StorageType::InMemory => Ok(Self::InMemory),
            StorageType::Postgres => {
                let url = settings
                    .database_url
                    .as_deref()
                    .filter(|url| !url.trim().is_empty())
                    .ok_or_else(|| {
                        DomainError::configuration(
                            "storage.database_url is required for the postgres backend",
                        )
                    })?;

                Ok(Self::Postgres {
                    config: PostgresConfig::new(url)
                        .with_max_connections(settings.max_connections),
                    run_migrations: settings.run_migrations,
                })
            }
        }
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres { .. } => StorageType::Postgres,
        }
    }
}

/// The three repositories the services are built on
#[derive(Debug, Clone)]
pub struct Repositories {
    pub teams: Arc<dyn TeamRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub invitations: Arc<dyn InvitationRepository>,
}

/// Factory for creating repository sets
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates repositories for the configured backend
    pub async fn create(config: &StorageConfig) -> Result<Repositories, DomainError> {
        match config {
            StorageConfig::InMemory => {
                info!("Using in-memory storage");
                Ok(Self::create_in_memory())
            }
            StorageConfig::Postgres {
                config,
                run_migrations,
            } => {
                info!(max_connections = config.max_connections, "Using PostgreSQL storage");
                let pool = config.connect().await?;

                if *run_migrations {
                    let applied = run_storage_migrations(&pool).await?;
                    info!(applied, "Schema migrations checked");
                }

                Ok(Repositories {
                    teams: Arc::new(PostgresTeamRepository::new(pool.clone())),
                    members: Arc::new(PostgresMemberRepository::new(pool.clone())),
                    invitations: Arc::new(PostgresInvitationRepository::new(pool)),
                })
            }
        }
    }

    /// Members are shared between the member and invitation repositories
    /// so that redeeming an invitation is visible to member queries
    pub fn create_in_memory() -> Repositories {
        let members: Arc<dyn Storage<Member>> = Arc::new(InMemoryStorage::<Member>::new());
        let teams: Arc<dyn Storage<Team>> = Arc::new(InMemoryStorage::<Team>::new());
        let invitations: Arc<dyn Storage<Invitation>> =
            Arc::new(InMemoryStorage::<Invitation>::new());

        Repositories {
            teams: Arc::new(StorageTeamRepository::new(teams)),
            members: Arc::new(StorageMemberRepository::new(members.clone())),
            invitations: Arc::new(StorageInvitationRepository::new(invitations, members)),
        }
    }
}
