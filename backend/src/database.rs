use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::AppError;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, AppError> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(30));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // Every connection to an in-memory database is a fresh database,
        // so those pools are pinned to a single connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 20 })
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        info!("Database pool ready ({})", if in_memory { "in-memory" } else { database_url });

        Ok(Database { pool })
    }

    /// Fresh migrated in-memory database, used by tests.
    pub async fn in_memory() -> Result<Self, AppError> {
        let database = Database::new("sqlite::memory:").await?;
        database.migrate().await?;
        Ok(database)
    }

    /// Migrated file-backed database under `dir`, with a real multi-connection
    /// pool. Tests that need writers to actually overlap use this.
    #[cfg(test)]
    pub(crate) async fn on_disk(dir: &std::path::Path) -> Result<Self, AppError> {
        let url = format!("sqlite://{}", dir.join("storefront.db").display());
        let database = Database::new(&url).await?;
        database.migrate().await?;
        Ok(database)
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    /// Round-trip to the database, used by the health check.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
