use anyhow::{Context, Result};
use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};

use crate::app_state::{DbConnectionManager, DbPool};

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let manager = DbConnectionManager::new(database_url);
    let pool = DbPool::builder()
        .build(manager)
        .await
        .context("Failed to build the DB connection pool")?;
    Ok(pool)
}

/// Applies pending embedded migrations over a dedicated synchronous
/// connection, off the async runtime. Returns how many ran.
pub async fn run_migrations_blocking(
    migrations: EmbeddedMigrations,
    database_url: &str,
) -> Result<usize> {
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url)
            .context("Failed to connect for running migrations")?;
        let versions = conn
            .run_pending_migrations(migrations)
            .map_err(|err| anyhow::anyhow!("Failed to run migrations: {err}"))?;
        Ok(versions.len())
    })
    .await
    .context("Migration task panicked")?
}
