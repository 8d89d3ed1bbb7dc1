// core/src/models/mod.rs

//! Records owned by the cart engine and the read-only product shape it
//! decorates them with.

pub mod cart;
pub mod cart_item;
pub mod cart_view;
pub mod product;

pub use cart::{Cart, CartWithItems};
pub use cart_item::{CartItem, NewCartItem, QuantityChange};
pub use cart_view::{CartLine, CartView};
pub use product::Product;
