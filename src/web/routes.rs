// src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{cart_handlers, checkout_handlers, order_handlers, product_handlers, wallet_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::view_cart_handler))
          .route("/add", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/clear", web::post().to(cart_handlers::clear_cart_handler)),
      )
      .service(web::scope("/checkout").route("", web::post().to(checkout_handlers::place_order_handler)))
      .service(
        web::scope("/wallet")
          .route("", web::get().to(wallet_handlers::get_wallet_handler))
          .route("/add-money", web::post().to(wallet_handlers::add_money_handler))
          .route("/transactions", web::get().to(wallet_handlers::list_transactions_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::upload_crop_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
      ),
  );
}
