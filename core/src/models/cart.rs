// core/src/models/cart.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart_item::CartItem;

/// A cart, addressed externally only through its client-held `cart_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
  pub id: Uuid,
  pub cart_token: String,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  pub fn new(cart_token: impl Into<String>) -> Self {
    Self {
      id: Uuid::new_v4(),
      cart_token: cart_token.into(),
      updated_at: Utc::now(),
    }
  }
}

/// A cart together with its items, ordered by creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartWithItems {
  pub cart: Cart,
  pub items: Vec<CartItem>,
}

impl CartWithItems {
  pub fn item_for_product(&self, product_id: &str) -> Option<&CartItem> {
    self.items.iter().find(|item| item.product_id == product_id)
  }
}
