//! Persistence layer for the medq queue engine.
//!
//! Owns the connection pool, the embedded migrations, the row/DTO models
//! and the repository structs. Every cross-record invariant (dense queue
//! positions, counter bounds, intent idempotency) is enforced here inside
//! single transactions with row locks; callers never see partial states.

pub mod error;
pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

/// Alias so downstream crates don't name sqlx types directly.
pub type DbPool = sqlx::PgPool;

/// Create a connection pool against the given Postgres URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(16)
        .connect(database_url)
        .await
}

/// Cheap connectivity probe used at startup and by the health endpoint.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from the embedded `./migrations` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
