// server/src/db/test_db.rs

//! Per-test Postgres databases inside one shared container.
//!
//! The container starts on first use. Each `TestDb` gets a freshly created
//! database with the migrations applied, so tests never see each other's rows.
//! When Docker is not reachable `TestDb::new` returns `None` and the calling
//! test skips itself.

use once_cell::sync::Lazy;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::OnceCell;
use uuid::Uuid;

const DB_USER: &str = "storefront_test";
const DB_PASSWORD: &str = "storefront_test_password";

struct SharedPostgres {
  // Held so the container lives as long as the test binary.
  _container: ContainerAsync<PostgresImage>,
  base_url: String,
}

static POSTGRES: Lazy<OnceCell<Option<SharedPostgres>>> = Lazy::new(OnceCell::new);

async fn start_postgres() -> Option<SharedPostgres> {
  let container = match PostgresImage::default()
    .with_user(DB_USER)
    .with_password(DB_PASSWORD)
    .with_db_name("storefront_test")
    .start()
    .await
  {
    Ok(container) => container,
    Err(e) => {
      eprintln!("Skipping Postgres tests, container failed to start: {}", e);
      return None;
    }
  };
  let port = container.get_host_port_ipv4(5432).await.ok()?;
  let host = std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());
  Some(SharedPostgres {
    base_url: format!("postgresql://{}:{}@{}:{}", DB_USER, DB_PASSWORD, host, port),
    _container: container,
  })
}

#[derive(Debug, Clone)]
pub struct TestDb {
  pub pool: PgPool,
}

impl TestDb {
  pub async fn new() -> Option<Self> {
    let shared = POSTGRES.get_or_init(start_postgres).await.as_ref()?;
    let name = format!("cart_test_{}", Uuid::new_v4().simple());

    let mut admin = PgConnection::connect(&format!("{}/postgres", shared.base_url))
      .await
      .expect("Failed to connect to postgres database");
    sqlx::query(&format!("CREATE DATABASE \"{}\"", name))
      .execute(&mut admin)
      .await
      .expect("Failed to create test database");
    admin.close().await.expect("Failed to close admin connection");

    let pool = PgPoolOptions::new()
      .max_connections(8)
      .connect(&format!("{}/{}", shared.base_url, name))
      .await
      .expect("Failed to create pool for test database");
    super::run_migrations(&pool)
      .await
      .expect("Failed to run migrations on test database");

    Some(Self { pool })
  }
}
