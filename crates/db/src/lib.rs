//! Persistence for the entity hierarchy, breakdown, and file revisions.

pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Default pool size when the caller does not configure one.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// PostgreSQL error codes the allocation path cares about.
pub mod error_codes {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const SERIALIZATION_FAILURE: &str = "40001";
    pub const DEADLOCK_DETECTED: &str = "40P01";
}

/// Constraints whose violation means a concurrent allocator won a race.
const ALLOCATION_CONSTRAINTS: &[&str] = &[
    "uq_working_files_revision",
    "uq_output_files_revision",
    "uq_asset_instances_number",
];

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Whether `err` is a transient conflict that a fresh attempt can resolve.
pub fn is_retryable_conflict(err: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db_err) = err else {
        return false;
    };
    match db_err.code().as_deref() {
        Some(error_codes::SERIALIZATION_FAILURE) | Some(error_codes::DEADLOCK_DETECTED) => true,
        Some(error_codes::UNIQUE_VIOLATION) => db_err
            .constraint()
            .is_some_and(|c| ALLOCATION_CONSTRAINTS.contains(&c)),
        _ => false,
    }
}

/// The constraint name of a unique violation, if `err` is one.
pub fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some(error_codes::UNIQUE_VIOLATION) =>
        {
            db_err.constraint()
        }
        _ => None,
    }
}
