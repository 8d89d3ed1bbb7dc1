// server/src/db/pg_cart_store.rs

//! `CartStore` over Postgres. Compound operations run as one statement or one
//! transaction, relying on the `carts.cart_token` and
//! `cart_items (cart_id, product_id)` unique constraints.

use async_trait::async_trait;
use cart_engine::{Cart, CartError, CartItem, CartResult, CartStore, CartWithItems, NewCartItem, QuantityChange};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use super::rows::{CartItemRow, CartRow, CART_COLUMNS, ITEM_COLUMNS};

// SQLSTATE numeric_value_out_of_range: a merged quantity exceeded INTEGER.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

#[derive(Debug, Clone)]
pub struct PgCartStore {
  pool: PgPool,
}

impl PgCartStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn items_for(&self, cart_id: Uuid) -> CartResult<Vec<CartItem>> {
    let rows: Vec<CartItemRow> = sqlx::query_as(&format!(
      "SELECT {} FROM cart_items WHERE cart_id = $1 ORDER BY created_at, id",
      ITEM_COLUMNS
    ))
    .bind(cart_id)
    .fetch_all(&self.pool)
    .await
    .map_err(store_error)?;
    Ok(rows.into_iter().map(CartItem::from).collect())
  }

  async fn with_items(&self, cart: Option<CartRow>) -> CartResult<Option<CartWithItems>> {
    let Some(cart) = cart else {
      return Ok(None);
    };
    let items = self.items_for(cart.id).await?;
    Ok(Some(CartWithItems {
      cart: cart.into(),
      items,
    }))
  }
}

/// Refreshes `carts.updated_at` inside the caller's transaction.
async fn touch_cart(conn: &mut PgConnection, cart_id: Uuid) -> CartResult<()> {
  sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
    .bind(cart_id)
    .execute(conn)
    .await
    .map_err(store_error)?;
  Ok(())
}

fn store_error(e: sqlx::Error) -> CartError {
  error!("Cart store database error: {}", e);
  CartError::store(e)
}

fn merge_error(e: sqlx::Error, product_id: &str) -> CartError {
  if let sqlx::Error::Database(db_err) = &e {
    if db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) {
      warn!(%product_id, "Merged quantity out of range.");
      return CartError::Validation(format!(
        "Quantity for product {} would exceed {}.",
        product_id,
        i32::MAX
      ));
    }
  }
  store_error(e)
}

#[async_trait]
impl CartStore for PgCartStore {
  async fn find_cart_by_token(&self, cart_token: &str) -> CartResult<Option<Cart>> {
    let row: Option<CartRow> = sqlx::query_as(&format!("SELECT {} FROM carts WHERE cart_token = $1", CART_COLUMNS))
      .bind(cart_token)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(row.map(Cart::from))
  }

  async fn find_cart_with_items(&self, cart_token: &str) -> CartResult<Option<CartWithItems>> {
    let row: Option<CartRow> = sqlx::query_as(&format!("SELECT {} FROM carts WHERE cart_token = $1", CART_COLUMNS))
      .bind(cart_token)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    self.with_items(row).await
  }

  async fn find_cart_with_items_by_id(&self, cart_id: Uuid) -> CartResult<Option<CartWithItems>> {
    let row: Option<CartRow> = sqlx::query_as(&format!("SELECT {} FROM carts WHERE id = $1", CART_COLUMNS))
      .bind(cart_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    self.with_items(row).await
  }

  #[instrument(name = "PgCartStore::create_cart", skip(self), err(Display))]
  async fn create_cart(&self, cart_token: &str) -> CartResult<Cart> {
    let cart = Cart::new(cart_token);
    let result: Result<CartRow, sqlx::Error> = sqlx::query_as(&format!(
      "INSERT INTO carts (id, cart_token, updated_at) VALUES ($1, $2, $3) RETURNING {}",
      CART_COLUMNS
    ))
    .bind(cart.id)
    .bind(&cart.cart_token)
    .bind(cart.updated_at)
    .fetch_one(&self.pool)
    .await;

    match result {
      Ok(row) => Ok(row.into()),
      Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
        debug!("Unique violation on cart_token.");
        Err(CartError::Conflict {
          cart_token: cart_token.to_string(),
        })
      }
      Err(e) => Err(store_error(e)),
    }
  }

  async fn find_item(&self, cart_id: Uuid, product_id: &str) -> CartResult<Option<CartItem>> {
    let row: Option<CartItemRow> = sqlx::query_as(&format!(
      "SELECT {} FROM cart_items WHERE cart_id = $1 AND product_id = $2",
      ITEM_COLUMNS
    ))
    .bind(cart_id)
    .bind(product_id)
    .fetch_optional(&self.pool)
    .await
    .map_err(store_error)?;
    Ok(row.map(CartItem::from))
  }

  async fn find_item_by_id(&self, item_id: Uuid) -> CartResult<Option<CartItem>> {
    let row: Option<CartItemRow> = sqlx::query_as(&format!("SELECT {} FROM cart_items WHERE id = $1", ITEM_COLUMNS))
      .bind(item_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(row.map(CartItem::from))
  }

  #[instrument(name = "PgCartStore::upsert_item", skip_all, fields(item_id = %item.id), err(Display))]
  async fn upsert_item(&self, item: &CartItem) -> CartResult<()> {
    let mut tx = self.pool.begin().await.map_err(store_error)?;
    sqlx::query(
      "INSERT INTO cart_items (id, cart_id, product_id, quantity, unit_price, created_at) \
       VALUES ($1, $2, $3, $4, $5, $6) \
       ON CONFLICT (id) DO UPDATE SET quantity = EXCLUDED.quantity, unit_price = EXCLUDED.unit_price",
    )
    .bind(item.id)
    .bind(item.cart_id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.created_at)
    .execute(&mut *tx)
    .await
    .map_err(store_error)?;
    touch_cart(&mut tx, item.cart_id).await?;
    tx.commit().await.map_err(store_error)
  }

  #[instrument(name = "PgCartStore::delete_item", skip(self), err(Display))]
  async fn delete_item(&self, item_id: Uuid) -> CartResult<Option<CartItem>> {
    let mut tx = self.pool.begin().await.map_err(store_error)?;
    let removed: Option<CartItemRow> =
      sqlx::query_as(&format!("DELETE FROM cart_items WHERE id = $1 RETURNING {}", ITEM_COLUMNS))
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error)?;

    let Some(removed) = removed else {
      // Nothing was written; dropping the transaction rolls it back.
      return Ok(None);
    };
    touch_cart(&mut tx, removed.cart_id).await?;
    tx.commit().await.map_err(store_error)?;
    Ok(Some(removed.into()))
  }

  /// One `INSERT ... ON CONFLICT DO UPDATE`: concurrent adds of the same
  /// product serialize on the row and none of their increments is lost. The
  /// price column is left out of the update so the first price sticks.
  #[instrument(name = "PgCartStore::merge_item", skip_all, fields(cart_id = %new_item.cart_id, product_id = %new_item.product_id), err(Display))]
  async fn merge_item(&self, new_item: NewCartItem) -> CartResult<CartItem> {
    let mut tx = self.pool.begin().await.map_err(store_error)?;
    let row: CartItemRow = sqlx::query_as(&format!(
      "INSERT INTO cart_items (id, cart_id, product_id, quantity, unit_price, created_at) \
       VALUES ($1, $2, $3, $4, $5, NOW()) \
       ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity \
       RETURNING {}",
      ITEM_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(new_item.cart_id)
    .bind(&new_item.product_id)
    .bind(new_item.quantity)
    .bind(new_item.unit_price)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| merge_error(e, &new_item.product_id))?;

    touch_cart(&mut tx, new_item.cart_id).await?;
    tx.commit().await.map_err(store_error)?;
    Ok(row.into())
  }

  /// Locks the row, then updates or deletes it in the same transaction.
  #[instrument(name = "PgCartStore::apply_quantity_delta", skip(self), err(Display))]
  async fn apply_quantity_delta(&self, item_id: Uuid, delta: i32) -> CartResult<Option<QuantityChange>> {
    let mut tx = self.pool.begin().await.map_err(store_error)?;
    let current: Option<CartItemRow> =
      sqlx::query_as(&format!("SELECT {} FROM cart_items WHERE id = $1 FOR UPDATE", ITEM_COLUMNS))
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error)?;

    let Some(current) = current else {
      return Ok(None);
    };
    let current = CartItem::from(current);

    let change = match current.quantity_after(delta)? {
      Some(quantity) => {
        let row: CartItemRow = sqlx::query_as(&format!(
          "UPDATE cart_items SET quantity = $2 WHERE id = $1 RETURNING {}",
          ITEM_COLUMNS
        ))
        .bind(item_id)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_error)?;
        QuantityChange::Updated(row.into())
      }
      None => {
        sqlx::query("DELETE FROM cart_items WHERE id = $1")
          .bind(item_id)
          .execute(&mut *tx)
          .await
          .map_err(store_error)?;
        QuantityChange::Removed(current)
      }
    };

    touch_cart(&mut tx, change.cart_id()).await?;
    tx.commit().await.map_err(store_error)?;
    Ok(Some(change))
  }
}
