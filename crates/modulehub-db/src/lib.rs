//! # modulehub-db
//!
//! Database layer for ModuleHub. A single SQLite database holds:
//! - **modules**: the registered catalogue, keyed by repository URL
//! - **users**: GitHub accounts that have signed in, with their access token

pub mod repository;

use anyhow::Result;
use modulehub_common::config::AppConfig;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Shared database state passed through Axum extractors.
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Connect using the `database` section of the application config.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        Self::connect_url(&config.database.url, config.database.max_connections).await
    }

    /// Connect to an explicit SQLite URL.
    pub async fn connect_url(url: &str, max_connections: u32) -> Result<Self> {
        tracing::info!("Connecting to SQLite at {url}...");
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        tracing::info!("Connected to SQLite");

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Migrations complete");
        Ok(())
    }
}

/// Returns `true` when the database answers a trivial query.
pub async fn health_check(pool: &SqlitePool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}

#[cfg(test)]
pub(crate) async fn test_database() -> Database {
    // One long-lived connection: every new in-memory connection is a fresh database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let db = Database { pool };
    db.migrate().await.unwrap();
    db
}
