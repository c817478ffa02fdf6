// src/api/handlers/health.rs
use actix_web::{HttpResponse, Result, web};
use serde::Serialize;
use crate::api::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub model_source: Option<String>,
    pub load_error: Option<String>,
}

pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let bundle = state.models.get().await;

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        model_loaded: bundle.is_some(),
        model_source: bundle.map(|b| b.source.clone()),
        load_error: state.models.load_error(),
    }))
}
