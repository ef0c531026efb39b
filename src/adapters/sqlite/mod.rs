//! SQLite database adapters for the order store.

pub mod connection;
pub mod migrations;
pub mod order_repository;

pub use connection::{create_pool, create_test_pool, ConnectionError, PoolConfig};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use order_repository::SqliteOrderRepository;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::PersistenceFailure(format!("invalid timestamp {s:?}: {e}")))
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

pub async fn initialize_database(database_url: &str, config: Option<PoolConfig>) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, config).await?;
    let migrator = Migrator::new(pool.clone());
    let applied = migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    tracing::info!(applied, "database migrations complete");
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_normalizes_to_utc() {
        let dt = parse_datetime("2021-11-26T09:22:19+03:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2021-11-26T06:22:19+00:00");
    }

    #[test]
    fn test_parse_datetime_invalid() {
        let err = parse_datetime("yesterday").unwrap_err();
        assert!(err.is_persistence());
    }

    #[tokio::test]
    async fn test_initialize_database_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("orders.db").display());

        let pool = initialize_database(&url, None).await.unwrap();
        sqlx::query("SELECT 1").execute(&pool).await.unwrap();
        pool.close().await;

        // Re-opening an initialized database applies nothing new.
        let pool = initialize_database(&url, None).await.unwrap();
        let version = Migrator::new(pool.clone()).get_current_version().await.unwrap();
        assert_eq!(version, 1);
        pool.close().await;
    }
}
