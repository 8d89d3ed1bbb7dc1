// core/src/catalog/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::ProductCatalog;
use crate::error::CartResult;
use crate::models::Product;

#[derive(Debug, Default)]
pub struct MemoryCatalog {
  products: RwLock<HashMap<String, Product>>,
}

impl MemoryCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
    let catalog = Self::new();
    for product in products {
      catalog.insert(product);
    }
    catalog
  }

  pub fn insert(&self, product: Product) {
    self.products.write().insert(product.id.clone(), product);
  }
}

#[async_trait]
impl ProductCatalog for MemoryCatalog {
  async fn find_products(&self, product_ids: &[String]) -> CartResult<HashMap<String, Product>> {
    let products = self.products.read();
    Ok(
      product_ids
        .iter()
        .filter_map(|id| products.get(id).map(|p| (id.clone(), p.clone())))
        .collect(),
    )
  }
}
