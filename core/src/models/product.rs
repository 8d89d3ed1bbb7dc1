// core/src/models/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog product, resolved at read time to decorate cart items.
/// The cart engine never writes these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: String,
  pub name: String,
  pub slug: String,
  pub price: Decimal,
  pub thumbnail: Option<String>,
  pub category: Option<String>,
}
