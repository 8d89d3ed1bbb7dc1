// server/src/db/mod.rs

//! Postgres-backed implementations of the cart engine's store and catalog.

pub mod pg_cart_store;
pub mod pg_catalog;
mod rows;
#[cfg(test)]
mod test_db;

pub use pg_cart_store::PgCartStore;
pub use pg_catalog::PgCatalog;

use crate::config::AppConfig;
use crate::errors::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

pub async fn connect(config: &AppConfig) -> Result<PgPool> {
  let pool = PgPoolOptions::new()
    .max_connections(config.db_max_connections)
    .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
    .connect(&config.database_url)
    .await?;
  Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
  sqlx::migrate!("./migrations").run(pool).await?;
  Ok(())
}
