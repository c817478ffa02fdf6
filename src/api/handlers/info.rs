// src/api/handlers/info.rs
use actix_web::{HttpResponse, Result, web};
use serde::Serialize;
use crate::api::AppState;

#[derive(Serialize, Default)]
pub struct InfoResponse {
    pub model_loaded: bool,
    pub model_source: Option<String>,
    pub backend: Option<&'static str>,
    pub device: Option<String>,
    pub dtype: Option<String>,
    pub tokenizer_type: Option<String>,
    pub loaded_at: Option<String>,
    pub load_error: Option<String>,
}

/// GET /info - What is loaded and where it runs
pub async fn model_info(state: web::Data<AppState>) -> Result<HttpResponse> {
    let response = match state.models.get().await {
        Some(bundle) => InfoResponse {
            model_loaded: true,
            model_source: Some(bundle.source.clone()),
            backend: Some(bundle.backend.name()),
            device: Some(bundle.device.clone()),
            dtype: Some(bundle.dtype.clone()),
            tokenizer_type: Some(bundle.tokenizer_type.clone()),
            loaded_at: Some(bundle.loaded_at.to_rfc3339()),
            load_error: None,
        },
        None => InfoResponse {
            load_error: state.models.load_error(),
            ..Default::default()
        },
    };

    Ok(HttpResponse::Ok().json(response))
}
