// core/src/models/cart_view.rs

//! The populated cart returned to callers after every operation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CartItem, CartWithItems, Product};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  #[serde(flatten)]
  pub item: CartItem,
  /// `None` when the catalog does not know `item.product_id`.
  pub product: Option<Product>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
  pub id: Uuid,
  pub cart_token: String,
  pub updated_at: DateTime<Utc>,
  pub items: Vec<CartLine>,
  pub total_quantity: i64,
  pub total_price: Decimal,
}

impl CartView {
  /// Joins a cart's items with whatever products the catalog resolved.
  pub fn assemble(cart: CartWithItems, products: &HashMap<String, Product>) -> Self {
    let total_quantity = cart.items.iter().map(|item| i64::from(item.quantity)).sum();
    let total_price = cart.items.iter().map(CartItem::line_total).sum();

    let items = cart
      .items
      .into_iter()
      .map(|item| {
        let product = products.get(&item.product_id).cloned();
        CartLine { item, product }
      })
      .collect();

    Self {
      id: cart.cart.id,
      cart_token: cart.cart.cart_token,
      updated_at: cart.cart.updated_at,
      items,
      total_quantity,
      total_price,
    }
  }

  pub fn line_for_product(&self, product_id: &str) -> Option<&CartLine> {
    self.items.iter().find(|line| line.item.product_id == product_id)
  }
}
