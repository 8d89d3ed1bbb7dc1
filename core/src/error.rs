// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartError {
  /// Caller input that can never succeed (empty token, non-positive quantity, ...).
  #[error("Validation error: {0}")]
  Validation(String),

  /// A cart with this token was inserted concurrently. The service recovers
  /// from this by re-reading the winner's row.
  #[error("Cart token already exists: {cart_token}")]
  Conflict { cart_token: String },

  #[error("Cart store failure. Source: {source}")]
  Store {
    #[source]
    source: AnyhowError,
  },

  #[error("Product catalog failure. Source: {source}")]
  Catalog {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal cart engine error: {0}")]
  Internal(String),
}

impl CartError {
  pub fn store(source: impl Into<AnyhowError>) -> Self {
    CartError::Store { source: source.into() }
  }

  pub fn catalog(source: impl Into<AnyhowError>) -> Self {
    CartError::Catalog { source: source.into() }
  }

  pub fn is_conflict(&self) -> bool {
    matches!(self, CartError::Conflict { .. })
  }
}

pub type CartResult<T, E = CartError> = std::result::Result<T, E>;
