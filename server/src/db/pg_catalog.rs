// server/src/db/pg_catalog.rs

use async_trait::async_trait;
use cart_engine::{CartError, CartResult, Product, ProductCatalog};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{error, instrument};

use super::rows::ProductRow;

#[derive(Debug, Clone)]
pub struct PgCatalog {
  pool: PgPool,
}

impl PgCatalog {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl ProductCatalog for PgCatalog {
  #[instrument(name = "PgCatalog::find_products", skip_all, fields(count = product_ids.len()), err(Display))]
  async fn find_products(&self, product_ids: &[String]) -> CartResult<HashMap<String, Product>> {
    // Compared as text so ids that are not UUIDs just miss instead of failing the cast.
    let rows: Vec<ProductRow> = sqlx::query_as(
      "SELECT id::text AS id, name, slug, price, thumbnail, category FROM products WHERE id::text = ANY($1)",
    )
    .bind(product_ids)
    .fetch_all(&self.pool)
    .await
    .map_err(|e| {
      error!("Failed to fetch products from database: {}", e);
      CartError::catalog(e)
    })?;

    Ok(rows.into_iter().map(|row| (row.id.clone(), Product::from(row))).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::test_db::TestDb;
  use rust_decimal::Decimal;
  use uuid::Uuid;

  #[tokio::test]
  async fn finds_known_products_and_skips_the_rest() {
    let Some(db) = TestDb::new().await else {
      return;
    };
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO products (id, name, slug, price, thumbnail, category) VALUES ($1, $2, $3, $4, $5, NULL)")
      .bind(id)
      .bind("Brass Diya")
      .bind("brass-diya")
      .bind(Decimal::new(9950, 2))
      .bind("/uploads/diya.jpg")
      .execute(&db.pool)
      .await
      .unwrap();
    let catalog = PgCatalog::new(db.pool.clone());

    let ids = vec![id.to_string(), Uuid::new_v4().to_string(), "not-a-uuid".to_string()];
    let products = catalog.find_products(&ids).await.unwrap();

    assert_eq!(products.len(), 1);
    let product = &products[&id.to_string()];
    assert_eq!(product.name, "Brass Diya");
    assert_eq!(product.price, Decimal::new(9950, 2));
    assert!(product.category.is_none());
  }
}
