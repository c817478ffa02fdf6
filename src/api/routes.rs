// src/api/routes.rs
use actix_web::{HttpResponse, error, web};
use serde_json::json;
use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({ "error": message })),
        )
        .into()
    });

    cfg.app_data(json_config)
        .route("/health", web::get().to(handlers::health_check))
        .route("/info", web::get().to(handlers::model_info))
        .route("/predict", web::post().to(handlers::predict));
}
