// server/src/state.rs
use cart_engine::CartService;

#[derive(Clone, Debug)]
pub struct AppState {
  pub cart_service: CartService,
}
