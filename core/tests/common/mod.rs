// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use cart_engine::{
  Cart, CartError, CartItem, CartResult, CartService, CartStore, CartWithItems, MemoryCartStore, MemoryCatalog,
  NewCartItem, Product, ProductCatalog, QuantityChange,
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tracing::Level;
use uuid::Uuid;

// --- Helper for Tracing Setup ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn product(id: &str, name: &str, price: i64) -> Product {
  Product {
    id: id.to_string(),
    name: name.to_string(),
    slug: name.to_lowercase().replace(' ', "-"),
    price: Decimal::from(price),
    thumbnail: Some(format!("/uploads/{}.jpg", id)),
    category: Some("pooja-essentials".to_string()),
  }
}

pub fn sample_catalog() -> Arc<MemoryCatalog> {
  Arc::new(MemoryCatalog::with_products([
    product("prod-1", "Brass Diya", 100),
    product("prod-2", "Sandalwood Incense", 45),
  ]))
}

/// Service over a fresh in-memory store; the store handle is returned so
/// tests can inspect row counts.
pub fn memory_service() -> (CartService, Arc<MemoryCartStore>) {
  let store = Arc::new(MemoryCartStore::new());
  let service = CartService::new(store.clone(), sample_catalog());
  (service, store)
}

pub fn service_over(store: Arc<dyn CartStore>) -> CartService {
  CartService::new(store, sample_catalog())
}

// --- Test stores ---

/// Forwards only the primitive operations, so the trait's default
/// `merge_item` / `apply_quantity_delta` bodies are the ones that run.
#[derive(Debug, Default)]
pub struct PrimitiveOnlyStore {
  pub inner: MemoryCartStore,
}

#[async_trait]
impl CartStore for PrimitiveOnlyStore {
  async fn find_cart_by_token(&self, cart_token: &str) -> CartResult<Option<Cart>> {
    self.inner.find_cart_by_token(cart_token).await
  }
  async fn find_cart_with_items(&self, cart_token: &str) -> CartResult<Option<CartWithItems>> {
    self.inner.find_cart_with_items(cart_token).await
  }
  async fn find_cart_with_items_by_id(&self, cart_id: Uuid) -> CartResult<Option<CartWithItems>> {
    self.inner.find_cart_with_items_by_id(cart_id).await
  }
  async fn create_cart(&self, cart_token: &str) -> CartResult<Cart> {
    self.inner.create_cart(cart_token).await
  }
  async fn find_item(&self, cart_id: Uuid, product_id: &str) -> CartResult<Option<CartItem>> {
    self.inner.find_item(cart_id, product_id).await
  }
  async fn find_item_by_id(&self, item_id: Uuid) -> CartResult<Option<CartItem>> {
    self.inner.find_item_by_id(item_id).await
  }
  async fn upsert_item(&self, item: &CartItem) -> CartResult<()> {
    self.inner.upsert_item(item).await
  }
  async fn delete_item(&self, item_id: Uuid) -> CartResult<Option<CartItem>> {
    self.inner.delete_item(item_id).await
  }
}

/// Simulates losing the creation race: the first token lookup misses even
/// though another writer already inserted the cart.
#[derive(Debug, Default)]
pub struct RacingStore {
  pub inner: MemoryCartStore,
  pub lookups_hidden: AtomicUsize,
  pub conflicts_seen: AtomicUsize,
}

#[async_trait]
impl CartStore for RacingStore {
  async fn find_cart_by_token(&self, cart_token: &str) -> CartResult<Option<Cart>> {
    if self.lookups_hidden.fetch_add(1, Ordering::SeqCst) == 0 {
      return Ok(None);
    }
    self.inner.find_cart_by_token(cart_token).await
  }
  async fn find_cart_with_items(&self, cart_token: &str) -> CartResult<Option<CartWithItems>> {
    self.inner.find_cart_with_items(cart_token).await
  }
  async fn find_cart_with_items_by_id(&self, cart_id: Uuid) -> CartResult<Option<CartWithItems>> {
    self.inner.find_cart_with_items_by_id(cart_id).await
  }
  async fn create_cart(&self, cart_token: &str) -> CartResult<Cart> {
    let result = self.inner.create_cart(cart_token).await;
    if matches!(&result, Err(err) if err.is_conflict()) {
      self.conflicts_seen.fetch_add(1, Ordering::SeqCst);
    }
    result
  }
  async fn find_item(&self, cart_id: Uuid, product_id: &str) -> CartResult<Option<CartItem>> {
    self.inner.find_item(cart_id, product_id).await
  }
  async fn find_item_by_id(&self, item_id: Uuid) -> CartResult<Option<CartItem>> {
    self.inner.find_item_by_id(item_id).await
  }
  async fn upsert_item(&self, item: &CartItem) -> CartResult<()> {
    self.inner.upsert_item(item).await
  }
  async fn delete_item(&self, item_id: Uuid) -> CartResult<Option<CartItem>> {
    self.inner.delete_item(item_id).await
  }
  async fn merge_item(&self, new_item: NewCartItem) -> CartResult<CartItem> {
    self.inner.merge_item(new_item).await
  }
  async fn apply_quantity_delta(&self, item_id: Uuid, delta: i32) -> CartResult<Option<QuantityChange>> {
    self.inner.apply_quantity_delta(item_id, delta).await
  }
}

/// Fails every mutation of items while `failing` is set.
#[derive(Debug, Default)]
pub struct FlakyStore {
  pub inner: MemoryCartStore,
  pub failing: AtomicBool,
}

impl FlakyStore {
  fn check(&self) -> CartResult<()> {
    if self.failing.load(Ordering::SeqCst) {
      return Err(CartError::store(anyhow!("connection reset by peer")));
    }
    Ok(())
  }
}

#[async_trait]
impl CartStore for FlakyStore {
  async fn find_cart_by_token(&self, cart_token: &str) -> CartResult<Option<Cart>> {
    self.inner.find_cart_by_token(cart_token).await
  }
  async fn find_cart_with_items(&self, cart_token: &str) -> CartResult<Option<CartWithItems>> {
    self.inner.find_cart_with_items(cart_token).await
  }
  async fn find_cart_with_items_by_id(&self, cart_id: Uuid) -> CartResult<Option<CartWithItems>> {
    self.inner.find_cart_with_items_by_id(cart_id).await
  }
  async fn create_cart(&self, cart_token: &str) -> CartResult<Cart> {
    self.inner.create_cart(cart_token).await
  }
  async fn find_item(&self, cart_id: Uuid, product_id: &str) -> CartResult<Option<CartItem>> {
    self.inner.find_item(cart_id, product_id).await
  }
  async fn find_item_by_id(&self, item_id: Uuid) -> CartResult<Option<CartItem>> {
    self.inner.find_item_by_id(item_id).await
  }
  async fn upsert_item(&self, item: &CartItem) -> CartResult<()> {
    self.check()?;
    self.inner.upsert_item(item).await
  }
  async fn delete_item(&self, item_id: Uuid) -> CartResult<Option<CartItem>> {
    self.check()?;
    self.inner.delete_item(item_id).await
  }
  async fn merge_item(&self, new_item: NewCartItem) -> CartResult<CartItem> {
    self.check()?;
    self.inner.merge_item(new_item).await
  }
  async fn apply_quantity_delta(&self, item_id: Uuid, delta: i32) -> CartResult<Option<QuantityChange>> {
    self.check()?;
    self.inner.apply_quantity_delta(item_id, delta).await
  }
}

/// Catalog that always fails, for error propagation tests.
#[derive(Debug, Default)]
pub struct BrokenCatalog;

#[async_trait]
impl ProductCatalog for BrokenCatalog {
  async fn find_products(&self, _product_ids: &[String]) -> CartResult<HashMap<String, Product>> {
    Err(CartError::catalog(anyhow!("catalog unavailable")))
  }
}
