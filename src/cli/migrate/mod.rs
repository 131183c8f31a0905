//! Migrate command - applies the PostgreSQL schema and exits

use tracing::info;

use super::{bootstrap, MigrateArgs};
use crate::infrastructure::storage::{run_storage_migrations, PostgresConfig, PostgresMigrator};

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = bootstrap();

    let url = args
        .database_url
        .or(config.storage.database_url)
        .ok_or_else(|| anyhow::anyhow!("A database URL is required (--database-url or storage.database_url)"))?;

    let pool = PostgresConfig::new(url)
        .with_max_connections(1)
        .with_min_connections(1)
        .connect()
        .await?;

    let applied = run_storage_migrations(&pool).await?;
    let version = PostgresMigrator::new(pool).current_version().await?;

    info!(applied, version = ?version, "Migrations complete");
    Ok(())
}
