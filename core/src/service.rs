// core/src/service.rs

//! `CartService`: the merge/delete rules on top of a `CartStore`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::catalog::ProductCatalog;
use crate::error::{CartError, CartResult};
use crate::models::{Cart, CartView, CartWithItems, NewCartItem, QuantityChange};
use crate::store::CartStore;

/// Quantity used by `add_item` callers that do not specify one.
pub const DEFAULT_QUANTITY: i32 = 1;

/// Step used by increase/decrease callers that do not specify one.
pub const DEFAULT_DELTA: i32 = 1;

#[derive(Clone)]
pub struct CartService {
  store: Arc<dyn CartStore>,
  catalog: Arc<dyn ProductCatalog>,
}

impl fmt::Debug for CartService {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CartService").finish_non_exhaustive()
  }
}

impl CartService {
  pub fn new(store: Arc<dyn CartStore>, catalog: Arc<dyn ProductCatalog>) -> Self {
    Self { store, catalog }
  }

  /// Returns the cart for `cart_token`, creating it on first sight.
  ///
  /// Two callers racing on a brand-new token both try to insert; the loser
  /// gets `CartError::Conflict` from the store and re-reads the winner's row.
  #[instrument(name = "CartService::get_or_create_cart", skip(self), err(Display))]
  pub async fn get_or_create_cart(&self, cart_token: &str) -> CartResult<Cart> {
    validate_token(cart_token)?;

    if let Some(cart) = self.store.find_cart_by_token(cart_token).await? {
      return Ok(cart);
    }

    match self.store.create_cart(cart_token).await {
      Ok(cart) => {
        info!(cart_id = %cart.id, "Cart created.");
        Ok(cart)
      }
      Err(err) if err.is_conflict() => {
        debug!("Lost cart creation race; re-reading existing cart.");
        self.store.find_cart_by_token(cart_token).await?.ok_or_else(|| {
          CartError::Internal(format!(
            "Cart token {} reported as taken but no cart was found.",
            cart_token
          ))
        })
      }
      Err(err) => Err(err),
    }
  }

  /// Adds `quantity` of `product_id` to the cart. A product already in the
  /// cart has its quantity increased and keeps its original unit price.
  #[instrument(name = "CartService::add_item", skip(self), err(Display))]
  pub async fn add_item(
    &self,
    cart_token: &str,
    product_id: &str,
    quantity: i32,
    unit_price: Decimal,
  ) -> CartResult<CartView> {
    if product_id.trim().is_empty() {
      return Err(CartError::Validation("Product id must not be empty.".to_string()));
    }
    if quantity < 1 {
      return Err(CartError::Validation(format!(
        "Quantity must be a positive number, got {}.",
        quantity
      )));
    }
    if unit_price < Decimal::ZERO {
      return Err(CartError::Validation(format!(
        "Unit price must not be negative, got {}.",
        unit_price
      )));
    }

    let cart = self.get_or_create_cart(cart_token).await?;
    let item = self
      .store
      .merge_item(NewCartItem {
        cart_id: cart.id,
        product_id: product_id.to_string(),
        quantity,
        unit_price,
      })
      .await?;
    info!(item_id = %item.id, quantity = item.quantity, "Item added to cart.");

    self.populated_by_id(cart.id).await?.ok_or_else(|| {
      CartError::Internal(format!("Cart {} disappeared after adding an item.", cart.id))
    })
  }

  /// Returns the populated cart for `cart_token`, creating an empty one if
  /// the token has never been seen.
  #[instrument(name = "CartService::get_cart", skip(self), err(Display))]
  pub async fn get_cart(&self, cart_token: &str) -> CartResult<CartView> {
    self.get_or_create_cart(cart_token).await?;
    let cart = self
      .store
      .find_cart_with_items(cart_token)
      .await?
      .ok_or_else(|| CartError::Internal(format!("Cart for token {} disappeared after creation.", cart_token)))?;
    Ok(self.populate(cart).await)
  }

  /// `Ok(None)` when the item does not exist.
  #[instrument(name = "CartService::increase_item_quantity", skip(self), err(Display))]
  pub async fn increase_item_quantity(&self, item_id: Uuid, delta: i32) -> CartResult<Option<CartView>> {
    validate_delta(delta)?;
    self.adjust(item_id, delta).await
  }

  /// `Ok(None)` when the item does not exist. An item whose quantity would
  /// reach zero or below is removed from the cart.
  #[instrument(name = "CartService::decrease_item_quantity", skip(self), err(Display))]
  pub async fn decrease_item_quantity(&self, item_id: Uuid, delta: i32) -> CartResult<Option<CartView>> {
    validate_delta(delta)?;
    self.adjust(item_id, -delta).await
  }

  /// `Ok(None)` when the item does not exist.
  #[instrument(name = "CartService::remove_item", skip(self), err(Display))]
  pub async fn remove_item(&self, item_id: Uuid) -> CartResult<Option<CartView>> {
    let Some(removed) = self.store.delete_item(item_id).await? else {
      warn!("Item not found; nothing to remove.");
      return Ok(None);
    };
    info!(cart_id = %removed.cart_id, product_id = %removed.product_id, "Item removed from cart.");
    self.populated_by_id(removed.cart_id).await
  }

  async fn adjust(&self, item_id: Uuid, delta: i32) -> CartResult<Option<CartView>> {
    let Some(change) = self.store.apply_quantity_delta(item_id, delta).await? else {
      warn!("Item not found; quantity left unchanged.");
      return Ok(None);
    };
    let item = change.item();
    match &change {
      QuantityChange::Updated(_) => info!(cart_id = %item.cart_id, quantity = item.quantity, "Item quantity changed."),
      QuantityChange::Removed(_) => {
        info!(cart_id = %item.cart_id, product_id = %item.product_id, "Item quantity reached zero; item removed.")
      }
    }
    self.populated_by_id(change.cart_id()).await
  }

  async fn populated_by_id(&self, cart_id: Uuid) -> CartResult<Option<CartView>> {
    match self.store.find_cart_with_items_by_id(cart_id).await? {
      Some(cart) => Ok(Some(self.populate(cart).await)),
      None => Ok(None),
    }
  }

  async fn populate(&self, cart: CartWithItems) -> CartView {
    let products = if cart.items.is_empty() {
      HashMap::new()
    } else {
      let mut ids: Vec<String> = cart.items.iter().map(|item| item.product_id.clone()).collect();
      ids.sort();
      ids.dedup();
      // Products only decorate the lines; the cart itself is already settled.
      match self.catalog.find_products(&ids).await {
        Ok(products) => products,
        Err(err) => {
          warn!(cart_id = %cart.cart.id, error = %err, "Product lookup failed; returning cart without products.");
          HashMap::new()
        }
      }
    };
    CartView::assemble(cart, &products)
  }
}

fn validate_token(cart_token: &str) -> CartResult<()> {
  if cart_token.trim().is_empty() {
    return Err(CartError::Validation("Cart token must not be empty.".to_string()));
  }
  Ok(())
}

fn validate_delta(delta: i32) -> CartResult<()> {
  if delta < 1 {
    return Err(CartError::Validation(format!(
      "Quantity step must be a positive number, got {}.",
      delta
    )));
  }
  Ok(())
}
