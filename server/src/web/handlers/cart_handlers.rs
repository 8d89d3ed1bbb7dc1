// server/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use cart_engine::{DEFAULT_DELTA, DEFAULT_QUANTITY};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddItemPayload {
  pub cart_token: String,
  pub product_id: String,
  #[serde(default = "default_quantity", deserialize_with = "quantity_from_any")]
  pub quantity: i32,
  pub unit_price: Decimal,
}

fn default_quantity() -> i32 {
  DEFAULT_QUANTITY
}

// Storefront clients have sent quantity both as a number and as a numeric
// string; both are accepted and truncated to an integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuantityInput {
  Int(i64),
  Float(f64),
  Text(String),
}

fn quantity_from_any<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
  D: Deserializer<'de>,
{
  use serde::de::Error;

  let as_float = match QuantityInput::deserialize(deserializer)? {
    QuantityInput::Int(n) => return i32::try_from(n).map_err(|_| D::Error::custom(format!("quantity {} is out of range", n))),
    QuantityInput::Float(f) => f,
    QuantityInput::Text(s) => {
      let trimmed = s.trim();
      match trimmed.parse::<i64>() {
        Ok(n) => return i32::try_from(n).map_err(|_| D::Error::custom(format!("quantity {} is out of range", n))),
        Err(_) => trimmed
          .parse::<f64>()
          .map_err(|_| D::Error::custom(format!("quantity '{}' is not a number", s)))?,
      }
    }
  };

  if !as_float.is_finite() || as_float.trunc() > f64::from(i32::MAX) || as_float.trunc() < f64::from(i32::MIN) {
    return Err(D::Error::custom(format!("quantity {} is out of range", as_float)));
  }
  Ok(as_float.trunc() as i32)
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartTokenQuery {
  pub cart_token: String,
}

#[derive(Deserialize, Debug)]
pub struct AdjustQuery {
  pub delta: Option<i32>,
}

/// An id that is not a UUID cannot name a stored item, so it is treated the
/// same as a missing one.
fn parse_item_id(raw: &str) -> Option<Uuid> {
  match Uuid::parse_str(raw) {
    Ok(id) => Some(id),
    Err(_) => {
      warn!(item_id = %raw, "Item id is not a UUID; treating as absent.");
      None
    }
  }
}

// --- Handler Implementation ---

#[instrument(
    name = "handler::add_item",
    skip(app_state, payload),
    fields(cart_token = %payload.cart_token, product_id = %payload.product_id, quantity = %payload.quantity)
)]
pub async fn add_item_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<AddItemPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let view = app_state
    .cart_service
    .add_item(&payload.cart_token, &payload.product_id, payload.quantity, payload.unit_price)
    .await?;

  info!(cart_id = %view.id, lines = view.items.len(), "Item added to cart.");
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::get_cart", skip(app_state, query), fields(cart_token = %query.cart_token))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CartTokenQuery>,
) -> Result<HttpResponse, AppError> {
  let view = app_state.cart_service.get_cart(&query.cart_token).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::increase_item", skip(app_state, path, query), fields(item_id = %path.as_ref()))]
pub async fn increase_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  query: web::Query<AdjustQuery>,
) -> Result<HttpResponse, AppError> {
  let Some(item_id) = parse_item_id(&path) else {
    return Ok(HttpResponse::Ok().json(None::<()>));
  };
  let delta = query.delta.unwrap_or(DEFAULT_DELTA);
  let view = app_state.cart_service.increase_item_quantity(item_id, delta).await?;
  // `null` body when the item does not exist.
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::decrease_item", skip(app_state, path, query), fields(item_id = %path.as_ref()))]
pub async fn decrease_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  query: web::Query<AdjustQuery>,
) -> Result<HttpResponse, AppError> {
  let Some(item_id) = parse_item_id(&path) else {
    return Ok(HttpResponse::Ok().json(None::<()>));
  };
  let delta = query.delta.unwrap_or(DEFAULT_DELTA);
  let view = app_state.cart_service.decrease_item_quantity(item_id, delta).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::remove_item", skip(app_state, path), fields(item_id = %path.as_ref()))]
pub async fn remove_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let Some(item_id) = parse_item_id(&path) else {
    return Ok(HttpResponse::Ok().json(None::<()>));
  };
  let view = app_state.cart_service.remove_item(item_id).await?;
  Ok(HttpResponse::Ok().json(view))
}
