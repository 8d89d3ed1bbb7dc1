// server/src/db/rows.rs

use cart_engine::{Cart, CartItem, Product};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

pub(crate) const CART_COLUMNS: &str = "id, cart_token, updated_at";
pub(crate) const ITEM_COLUMNS: &str = "id, cart_id, product_id, quantity, unit_price, created_at";

#[derive(Debug, FromRow)]
pub(crate) struct CartRow {
  pub id: Uuid,
  pub cart_token: String,
  pub updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
  fn from(row: CartRow) -> Self {
    Cart {
      id: row.id,
      cart_token: row.cart_token,
      updated_at: row.updated_at,
    }
  }
}

#[derive(Debug, FromRow)]
pub(crate) struct CartItemRow {
  pub id: Uuid,
  pub cart_id: Uuid,
  pub product_id: String,
  pub quantity: i32,
  pub unit_price: Decimal,
  pub created_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
  fn from(row: CartItemRow) -> Self {
    CartItem {
      id: row.id,
      cart_id: row.cart_id,
      product_id: row.product_id,
      quantity: row.quantity,
      unit_price: row.unit_price,
      created_at: row.created_at,
    }
  }
}

#[derive(Debug, FromRow)]
pub(crate) struct ProductRow {
  pub id: String,
  pub name: String,
  pub slug: String,
  pub price: Decimal,
  pub thumbnail: Option<String>,
  pub category: Option<String>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      name: row.name,
      slug: row.slug,
      price: row.price,
      thumbnail: row.thumbnail,
      category: row.category,
    }
  }
}
