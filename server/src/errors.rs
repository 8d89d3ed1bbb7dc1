// server/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use cart_engine::CartError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Cart Error: {source}")]
  Cart {
    #[from] // Allows `?` on cart_engine results
    source: CartError,
  },
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Cart { source } => match source {
        CartError::Validation(_) => StatusCode::BAD_REQUEST,
        // The service resolves token races itself; seeing one here is a bug.
        CartError::Conflict { .. } => StatusCode::CONFLICT,
        CartError::Store { .. } | CartError::Catalog { .. } | CartError::Internal(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    let body = match self {
      AppError::Validation(m) => json!({"error": m}),
      AppError::Cart { source } => match source {
        CartError::Validation(m) => json!({"error": m}),
        CartError::Conflict { .. } => json!({"error": "Cart is being created concurrently; retry the request."}),
        CartError::Store { .. } => json!({"error": "Database operation failed"}),
        CartError::Catalog { .. } => json!({"error": "Product catalog unavailable"}),
        CartError::Internal(m) => json!({"error": "An internal error occurred", "detail": m}),
      },
      AppError::Config(m) => json!({"error": "Configuration issue", "detail": m}),
      AppError::Sqlx(_) | AppError::Migration(_) => json!({"error": "Database operation failed"}),
    };
    HttpResponse::build(self.status_code()).json(body)
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cart_validation_maps_to_bad_request() {
    let err = AppError::from(CartError::Validation("bad".to_string()));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn store_failure_maps_to_internal_error() {
    let err = AppError::from(CartError::store(anyhow::anyhow!("boom")));
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
