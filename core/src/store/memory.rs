// core/src/store/memory.rs

use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, event, instrument, Level};
use uuid::Uuid;

use super::CartStore;
use crate::error::{CartError, CartResult};
use crate::models::{Cart, CartItem, CartWithItems, NewCartItem, QuantityChange};

#[derive(Debug, Default)]
struct MemoryState {
  carts: HashMap<Uuid, Cart>,
  tokens: HashMap<String, Uuid>,
  // Insertion order is creation order.
  items: Vec<CartItem>,
}

impl MemoryState {
  fn cart_with_items(&self, cart_id: Uuid) -> Option<CartWithItems> {
    let cart = self.carts.get(&cart_id)?.clone();
    let items = self.items.iter().filter(|item| item.cart_id == cart_id).cloned().collect();
    Some(CartWithItems { cart, items })
  }

  fn touch(&mut self, cart_id: Uuid) {
    if let Some(cart) = self.carts.get_mut(&cart_id) {
      cart.updated_at = Utc::now();
    }
  }

  fn position_of(&self, item_id: Uuid) -> Option<usize> {
    self.items.iter().position(|item| item.id == item_id)
  }

  fn upsert(&mut self, item: &CartItem) -> CartResult<()> {
    if !self.carts.contains_key(&item.cart_id) {
      return Err(CartError::store(anyhow!(
        "cart {} does not exist for item {}",
        item.cart_id,
        item.id
      )));
    }
    if item.quantity < 1 {
      return Err(CartError::store(anyhow!(
        "item {} cannot be stored with quantity {}",
        item.id,
        item.quantity
      )));
    }
    let duplicate = self
      .items
      .iter()
      .any(|other| other.id != item.id && other.cart_id == item.cart_id && other.product_id == item.product_id);
    if duplicate {
      return Err(CartError::store(anyhow!(
        "cart {} already has an item for product {}",
        item.cart_id,
        item.product_id
      )));
    }

    match self.position_of(item.id) {
      Some(idx) => self.items[idx] = item.clone(),
      None => self.items.push(item.clone()),
    }
    self.touch(item.cart_id);
    Ok(())
  }

  fn delete(&mut self, item_id: Uuid) -> Option<CartItem> {
    let idx = self.position_of(item_id)?;
    let removed = self.items.remove(idx);
    self.touch(removed.cart_id);
    Some(removed)
  }
}

/// In-process `CartStore`. Each operation, compound ones included, runs under
/// a single lock acquisition, so concurrent callers never interleave inside
/// one. Guards are never held across an `.await`.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
  state: RwLock<MemoryState>,
}

impl MemoryCartStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cart_count(&self) -> usize {
    self.state.read().carts.len()
  }

  pub fn item_count(&self) -> usize {
    self.state.read().items.len()
  }
}

#[async_trait]
impl CartStore for MemoryCartStore {
  async fn find_cart_by_token(&self, cart_token: &str) -> CartResult<Option<Cart>> {
    let state = self.state.read();
    Ok(state.tokens.get(cart_token).and_then(|id| state.carts.get(id)).cloned())
  }

  async fn find_cart_with_items(&self, cart_token: &str) -> CartResult<Option<CartWithItems>> {
    let state = self.state.read();
    Ok(state.tokens.get(cart_token).and_then(|id| state.cart_with_items(*id)))
  }

  async fn find_cart_with_items_by_id(&self, cart_id: Uuid) -> CartResult<Option<CartWithItems>> {
    Ok(self.state.read().cart_with_items(cart_id))
  }

  #[instrument(name = "MemoryCartStore::create_cart", skip(self), err(Display))]
  async fn create_cart(&self, cart_token: &str) -> CartResult<Cart> {
    let mut state = self.state.write();
    if state.tokens.contains_key(cart_token) {
      event!(Level::DEBUG, "Token already present.");
      return Err(CartError::Conflict {
        cart_token: cart_token.to_string(),
      });
    }
    let cart = Cart::new(cart_token);
    state.tokens.insert(cart.cart_token.clone(), cart.id);
    state.carts.insert(cart.id, cart.clone());
    Ok(cart)
  }

  async fn find_item(&self, cart_id: Uuid, product_id: &str) -> CartResult<Option<CartItem>> {
    let state = self.state.read();
    Ok(
      state
        .items
        .iter()
        .find(|item| item.cart_id == cart_id && item.product_id == product_id)
        .cloned(),
    )
  }

  async fn find_item_by_id(&self, item_id: Uuid) -> CartResult<Option<CartItem>> {
    let state = self.state.read();
    Ok(state.items.iter().find(|item| item.id == item_id).cloned())
  }

  async fn upsert_item(&self, item: &CartItem) -> CartResult<()> {
    self.state.write().upsert(item)
  }

  async fn delete_item(&self, item_id: Uuid) -> CartResult<Option<CartItem>> {
    Ok(self.state.write().delete(item_id))
  }

  #[instrument(name = "MemoryCartStore::merge_item", skip_all, fields(cart_id = %new_item.cart_id, product_id = %new_item.product_id), err(Display))]
  async fn merge_item(&self, new_item: NewCartItem) -> CartResult<CartItem> {
    let mut state = self.state.write();
    let existing = state
      .items
      .iter()
      .find(|item| item.cart_id == new_item.cart_id && item.product_id == new_item.product_id)
      .cloned();
    let item = match existing {
      Some(existing) => new_item.merge_into(existing)?,
      None => new_item.into_item(),
    };
    state.upsert(&item)?;
    debug!(item_id = %item.id, quantity = item.quantity, "Item merged.");
    Ok(item)
  }

  #[instrument(name = "MemoryCartStore::apply_quantity_delta", skip(self), err(Display))]
  async fn apply_quantity_delta(&self, item_id: Uuid, delta: i32) -> CartResult<Option<QuantityChange>> {
    let mut state = self.state.write();
    let Some(idx) = state.position_of(item_id) else {
      return Ok(None);
    };

    match state.items[idx].quantity_after(delta)? {
      Some(quantity) => {
        let mut item = state.items[idx].clone();
        item.quantity = quantity;
        state.upsert(&item)?;
        Ok(Some(QuantityChange::Updated(item)))
      }
      None => Ok(state.delete(item_id).map(QuantityChange::Removed)),
    }
  }
}
