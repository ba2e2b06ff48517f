use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::{debug, info};

use crate::config::DbConfig;

/// Migrations embedded at compile time from `crates/timeline-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Tables owned by the schema, in foreign-key order.
pub const SCHEMA_TABLES: [&str; 3] = ["accounts", "projects", "timelines"];

/// Upper bound on pooled connections. Every write holds one for the length
/// of its transaction, so this also bounds concurrent timeline writes.
const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(url)
        .await
        .with_context(|| format!("failed to connect to database at {url}"))
}

/// Open the application's connection pool.
pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    let pool = connect(&config.database_url, MAX_CONNECTIONS).await?;
    debug!(max_connections = MAX_CONNECTIONS, "database pool ready");
    Ok(pool)
}

/// Apply any embedded migrations the database has not seen yet.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;

    info!("migrations applied successfully");
    Ok(())
}

/// Whether `name` can be spliced into `CREATE DATABASE` unquoted.
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Create the target database through the `postgres` maintenance database
/// if it is missing. Returns `true` when the database was created.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<bool> {
    let db_name = config
        .database_name()
        .context("could not determine database name from URL")?;
    if !is_plain_identifier(db_name) {
        anyhow::bail!("database name {db_name:?} must be a plain SQL identifier");
    }

    let admin = connect(&config.maintenance_url(), 1).await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&admin)
            .await
            .context("failed to query pg_database")?;

    if exists {
        info!(db = db_name, "database already exists");
    } else {
        admin
            .execute(format!("CREATE DATABASE {db_name}").as_str())
            .await
            .with_context(|| format!("failed to create database {db_name}"))?;
        info!(db = db_name, "database created");
    }

    admin.close().await;
    Ok(!exists)
}

/// Row counts for each of [`SCHEMA_TABLES`], for the `db-init` summary.
pub async fn table_counts(pool: &PgPool) -> Result<Vec<(String, i64)>> {
    let (accounts, projects, timelines): (i64, i64, i64) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM accounts), \
                (SELECT COUNT(*) FROM projects), \
                (SELECT COUNT(*) FROM timelines)",
    )
    .fetch_one(pool)
    .await
    .context("failed to count rows")?;

    Ok(SCHEMA_TABLES
        .iter()
        .zip([accounts, projects, timelines])
        .map(|(table, count)| ((*table).to_owned(), count))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers() {
        assert!(is_plain_identifier("timeline"));
        assert!(is_plain_identifier("timeline_test_01"));
        assert!(is_plain_identifier("_scratch"));
    }

    #[test]
    fn rejects_names_needing_quotes() {
        assert!(!is_plain_identifier(""));
        assert!(!is_plain_identifier("1timeline"));
        assert!(!is_plain_identifier("time-line"));
        assert!(!is_plain_identifier("x; DROP DATABASE postgres"));
    }
}
