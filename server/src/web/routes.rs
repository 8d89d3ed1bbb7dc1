// server/src/web/routes.rs

use actix_web::{error::InternalError, web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::cart_handlers;

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Malformed bodies and query strings get the same JSON error shape as
// validation failures raised by the cart engine.
fn json_error_handler(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  let app_err = AppError::Validation(format!("Invalid request body: {}", err));
  let response = actix_web::ResponseError::error_response(&app_err);
  InternalError::from_response(err, response).into()
}

fn query_error_handler(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  let app_err = AppError::Validation(format!("Invalid query string: {}", err));
  let response = actix_web::ResponseError::error_response(&app_err);
  InternalError::from_response(err, response).into()
}

// This function is called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::scope("/cart")
        .route("", web::get().to(cart_handlers::get_cart_handler))
        .route("/items", web::post().to(cart_handlers::add_item_handler))
        .route("/items/{item_id}", web::delete().to(cart_handlers::remove_item_handler))
        .route(
          "/items/{item_id}/increase",
          web::patch().to(cart_handlers::increase_item_handler),
        )
        .route(
          "/items/{item_id}/decrease",
          web::patch().to(cart_handlers::decrease_item_handler),
        ),
    );
}
