//! Database module
//!
//! One SQLite pool, passed explicitly to every store function. Each store
//! is a set of free functions taking an executor, so the order workflow can
//! run them inside its own transaction.

pub mod cart;
pub mod orders;
pub mod products;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Open the pool for `url`, creating the database file if it is missing
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    tracing::info!(url, max_connections, "Database pool ready");
    Ok(pool)
}

/// Private in-memory database
///
/// A single connection that never expires: every connection to
/// `sqlite::memory:` is its own database, so the pool must hold exactly one.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

/// Begin a transaction that holds the write lock from its first statement
///
/// A deferred transaction that reads before writing cannot upgrade a stale
/// WAL snapshot and fails with `SQLITE_BUSY` without waiting. Taking the
/// lock up front lets `busy_timeout` queue concurrent writers instead.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Apply pending schema migrations
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
