//! HTTP handlers and route configuration.

mod health;
mod rpc;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/rpc")
                    .route("/{procedure}", web::get().to(rpc::query))
                    .route("/{procedure}", web::post().to(rpc::mutation)),
            ),
    );
}
