// core/src/lib.rs

//! cart_engine: a token-keyed shopping cart engine.
//!
//! A cart is created lazily the first time a client token is seen, and its
//! items follow a small state machine:
//!  - adding a product that is not in the cart inserts a line with the given
//!    quantity and unit price;
//!  - adding a product that is already there increases its quantity and keeps
//!    the price captured by the first add;
//!  - increasing or decreasing changes the quantity by a step, and a line whose
//!    quantity would reach zero or below is deleted instead of stored;
//!  - removing deletes the line outright.
//!
//! Persistence sits behind the [`CartStore`] trait and product decoration
//! behind [`ProductCatalog`]. In-memory implementations of both ship with the
//! crate; a database-backed store lives with the HTTP server.

pub mod catalog;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::catalog::{MemoryCatalog, ProductCatalog};
pub use crate::error::{CartError, CartResult};
pub use crate::models::{Cart, CartItem, CartLine, CartView, CartWithItems, NewCartItem, Product, QuantityChange};
pub use crate::service::{CartService, DEFAULT_DELTA, DEFAULT_QUANTITY};
pub use crate::store::{CartStore, MemoryCartStore};
