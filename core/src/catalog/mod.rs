// core/src/catalog/mod.rs

//! Read-only product lookup used to decorate cart items. The cart engine
//! never validates product ids against it; unknown ids simply resolve to
//! nothing.

pub mod memory;

pub use memory::MemoryCatalog;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::CartResult;
use crate::models::Product;

#[async_trait]
pub trait ProductCatalog: Send + Sync {
  /// Batch lookup. Ids with no product are absent from the returned map.
  async fn find_products(&self, product_ids: &[String]) -> CartResult<HashMap<String, Product>>;
}
