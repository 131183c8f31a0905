//! Storage infrastructure - backends and schema management

mod factory;
mod in_memory;
pub mod migrations;
mod postgres;

pub use factory::{Repositories, StorageConfig, StorageFactory, StorageType};
pub use in_memory::InMemoryStorage;
pub use migrations::{run_storage_migrations, storage_migrations, Migration, PostgresMigrator};
pub use postgres::PostgresConfig;
