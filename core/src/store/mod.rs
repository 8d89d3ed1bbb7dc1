// core/src/store/mod.rs

//! The `CartStore` contract and its in-process implementation.
//!
//! The primitive operations mirror a row-oriented repository. The two compound
//! operations (`merge_item`, `apply_quantity_delta`) are what the service
//! actually calls for mutations; their default bodies are a plain
//! read-then-write built from the primitives, and a store backed by shared
//! storage is expected to override them with a single atomic write.

pub mod memory;

pub use memory::MemoryCartStore;

use async_trait::async_trait;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::CartResult;
use crate::models::{Cart, CartItem, CartWithItems, NewCartItem, QuantityChange};

#[async_trait]
pub trait CartStore: Send + Sync {
  async fn find_cart_by_token(&self, cart_token: &str) -> CartResult<Option<Cart>>;

  async fn find_cart_with_items(&self, cart_token: &str) -> CartResult<Option<CartWithItems>>;

  async fn find_cart_with_items_by_id(&self, cart_id: Uuid) -> CartResult<Option<CartWithItems>>;

  /// Inserts a new cart. Fails with `CartError::Conflict` if the token is taken.
  async fn create_cart(&self, cart_token: &str) -> CartResult<Cart>;

  async fn find_item(&self, cart_id: Uuid, product_id: &str) -> CartResult<Option<CartItem>>;

  async fn find_item_by_id(&self, item_id: Uuid) -> CartResult<Option<CartItem>>;

  /// Inserts or updates by `item.id`, refreshing the owning cart's `updated_at`.
  async fn upsert_item(&self, item: &CartItem) -> CartResult<()>;

  /// Deletes by id and returns the removed row, if there was one.
  async fn delete_item(&self, item_id: Uuid) -> CartResult<Option<CartItem>>;

  /// Insert-or-increment for the `(cart_id, product_id)` pair.
  #[instrument(name = "CartStore::merge_item", skip_all, fields(cart_id = %new_item.cart_id, product_id = %new_item.product_id))]
  async fn merge_item(&self, new_item: NewCartItem) -> CartResult<CartItem> {
    let item = match self.find_item(new_item.cart_id, &new_item.product_id).await? {
      Some(existing) => new_item.merge_into(existing)?,
      None => new_item.into_item(),
    };
    self.upsert_item(&item).await?;
    Ok(item)
  }

  /// Adds `delta` (negative to decrease) to an item's quantity, deleting the
  /// item instead when the result would be zero or below. `None` if the item
  /// does not exist.
  #[instrument(name = "CartStore::apply_quantity_delta", skip(self))]
  async fn apply_quantity_delta(&self, item_id: Uuid, delta: i32) -> CartResult<Option<QuantityChange>> {
    let Some(mut item) = self.find_item_by_id(item_id).await? else {
      debug!("Item not found; nothing to adjust.");
      return Ok(None);
    };

    match item.quantity_after(delta)? {
      Some(quantity) => {
        item.quantity = quantity;
        self.upsert_item(&item).await?;
        Ok(Some(QuantityChange::Updated(item)))
      }
      None => Ok(self.delete_item(item_id).await?.map(QuantityChange::Removed)),
    }
  }
}
