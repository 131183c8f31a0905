//! Database schema migrations for the PostgreSQL backend

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Applies versioned migrations and records them in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    async fn is_applied(&self, version: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
            .bind(version)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))
    }

    /// Applies a migration unless it is already recorded.
    ///
    /// The schema change and its `_migrations` row commit together.
    /// Returns whether the migration ran.
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        if self.is_applied(migration.version).await? {
            return Ok(false);
        }

        let fail = |e: sqlx::Error| {
            DomainError::storage(format!(
                "Failed to run migration {}: {}",
                migration.version, e
            ))
        };

        let mut tx = self.pool.begin().await.map_err(fail)?;

        sqlx::raw_sql(migration.up).execute(&mut *tx).await.map_err(fail)?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;

        tx.commit().await.map_err(fail)?;

        info!(
            version = migration.version,
            description = migration.description,
            "Applied migration"
        );
        Ok(true)
    }

    /// Latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }
}

/// A versioned schema change
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static str,
}

/// Schema for teams, members and invitations
pub fn storage_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Create teams table",
            up: r#"
            CREATE TABLE IF NOT EXISTS teams (
                id VARCHAR(36) PRIMARY KEY,
                name VARCHAR(100) NOT NULL UNIQUE,
                leader_name VARCHAR(100) NOT NULL,
                leader_email VARCHAR(254) NOT NULL UNIQUE,
                description TEXT,
                max_members INTEGER NOT NULL DEFAULT 5,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_teams_created_at ON teams(created_at);
            "#,
        },
        Migration {
            version: 2,
            description: "Create members table",
            up: r#"
            CREATE TABLE IF NOT EXISTS members (
                id VARCHAR(36) PRIMARY KEY,
                team_id VARCHAR(36) NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                name VARCHAR(100) NOT NULL,
                email VARCHAR(254) NOT NULL,
                phone VARCHAR(16),
                role VARCHAR(100),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_members_team_id ON members(team_id);
            CREATE INDEX IF NOT EXISTS idx_members_email ON members(email);
            "#,
        },
        Migration {
            version: 3,
            description: "Create invitations table",
            up: r#"
            CREATE TABLE IF NOT EXISTS invitations (
                id VARCHAR(36) PRIMARY KEY,
                team_id VARCHAR(36) NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                email VARCHAR(254) NOT NULL,
                phone VARCHAR(16),
                token VARCHAR(64) NOT NULL UNIQUE,
                is_used BOOLEAN NOT NULL DEFAULT FALSE,
                otp_code VARCHAR(6),
                otp_verified BOOLEAN NOT NULL DEFAULT FALSE,
                otp_created_at TIMESTAMPTZ,
                otp_expires_at TIMESTAMPTZ,
                phone_verified_at TIMESTAMPTZ,
                expires_at TIMESTAMPTZ NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_invitations_team_id ON invitations(team_id);
            CREATE INDEX IF NOT EXISTS idx_invitations_email ON invitations(email);
            "#,
        },
    ]
}

/// Applies every pending storage migration in version order
pub async fn run_storage_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());
    let mut applied = 0;

    for migration in storage_migrations() {
        if migrator.run_migration(&migration).await? {
            applied += 1;
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_migrations_are_ascending() {
        let migrations = storage_migrations();

        assert_eq!(migrations.len(), 3);
        for pair in migrations.windows(2) {
            assert!(pair[1].version > pair[0].version);
        }
    }

    #[test]
    fn test_child_tables_cascade_on_team_delete() {
        let migrations = storage_migrations();

        for migration in &migrations[1..] {
            assert!(
                migration.up.contains("REFERENCES teams(id) ON DELETE CASCADE"),
                "{} must cascade",
                migration.description
            );
        }
    }

    #[test]
    fn test_uniqueness_constraints() {
        let migrations = storage_migrations();

        assert!(migrations[0].up.contains("name VARCHAR(100) NOT NULL UNIQUE"));
        assert!(migrations[0].up.contains("leader_email VARCHAR(254) NOT NULL UNIQUE"));
        assert!(migrations[2].up.contains("token VARCHAR(64) NOT NULL UNIQUE"));
    }
}
