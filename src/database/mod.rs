use anyhow::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod models;
pub mod repositories;
pub mod utils;

/// Connect to Postgres and run pending migrations.
///
/// The managed database provider drops idle connections, so every connection
/// is pinged before use and recycled after half an hour regardless.
pub async fn init_database(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .test_before_acquire(true)
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Migrations completed");

    Ok(pool)
}
