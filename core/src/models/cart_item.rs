// core/src/models/cart_item.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CartError, CartResult};

/// One line of a cart. A persisted item always has `quantity >= 1`, and a cart
/// holds at most one item per `product_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  pub id: Uuid,
  pub cart_id: Uuid,
  pub product_id: String,
  pub quantity: i32,
  /// Price captured when the product was first added. Later merges keep it.
  pub unit_price: Decimal,
  pub created_at: DateTime<Utc>,
}

impl CartItem {
  /// Quantity after applying `delta`, or `None` when the item should be
  /// deleted because the result would be zero or negative.
  pub fn quantity_after(&self, delta: i32) -> CartResult<Option<i32>> {
    match self.quantity.checked_add(delta) {
      Some(q) if q >= 1 => Ok(Some(q)),
      Some(_) => Ok(None),
      // Underflow can only mean "far below zero".
      None if delta < 0 => Ok(None),
      None => Err(CartError::Validation(format!(
        "Quantity for product {} would exceed {}.",
        self.product_id,
        i32::MAX
      ))),
    }
  }

  pub fn line_total(&self) -> Decimal {
    self.unit_price * Decimal::from(self.quantity)
  }
}

/// Input to an insert-or-increment. Becomes a fresh `CartItem` when the
/// product is not yet in the cart; otherwise only `quantity` is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
  pub cart_id: Uuid,
  pub product_id: String,
  pub quantity: i32,
  pub unit_price: Decimal,
}

impl NewCartItem {
  pub fn into_item(self) -> CartItem {
    CartItem {
      id: Uuid::new_v4(),
      cart_id: self.cart_id,
      product_id: self.product_id,
      quantity: self.quantity,
      unit_price: self.unit_price,
      created_at: Utc::now(),
    }
  }

  /// Applies this addition to an existing line for the same product.
  /// The existing unit price wins.
  pub fn merge_into(&self, mut existing: CartItem) -> CartResult<CartItem> {
    existing.quantity = existing.quantity.checked_add(self.quantity).ok_or_else(|| {
      CartError::Validation(format!(
        "Quantity for product {} would exceed {}.",
        self.product_id,
        i32::MAX
      ))
    })?;
    Ok(existing)
  }
}

/// Outcome of applying a quantity delta to an existing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityChange {
  Updated(CartItem),
  /// The quantity reached zero or below; this is the row that was deleted.
  Removed(CartItem),
}

impl QuantityChange {
  pub fn cart_id(&self) -> Uuid {
    match self {
      QuantityChange::Updated(item) | QuantityChange::Removed(item) => item.cart_id,
    }
  }

  pub fn item(&self) -> &CartItem {
    match self {
      QuantityChange::Updated(item) | QuantityChange::Removed(item) => item,
    }
  }
}
