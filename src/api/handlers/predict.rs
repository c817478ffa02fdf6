// src/api/handlers/predict.rs
use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;
use crate::api::AppState;
use crate::checker;
use crate::errors::CheckerError;
use crate::models::CheckRequest;

/// POST /predict - Check one student solution
pub async fn predict(
    state: web::Data<AppState>,
    req: web::Json<CheckRequest>,
) -> Result<HttpResponse> {
    let check_id = Uuid::new_v4();
    let req = req.into_inner();
    req.validate()?;

    let bundle = state.models.get().await.ok_or_else(|| {
        log::warn!("[{}] Rejected: no model loaded", check_id);
        CheckerError::ModelUnavailable {
            load_error: state.models.load_error(),
        }
    })?;

    log::info!(
        "[{}] Checking solution ({} chars, reference: {}, hint: {})",
        check_id,
        req.student_solution.chars().count(),
        req.use_reference && req.reference_solution.is_some(),
        req.answer_hint.is_some()
    );

    let result = checker::run_check(&bundle, &req, state.config.prompt_style)
        .await
        .map_err(|e| {
            log::error!("[{}] Inference failed: {}", check_id, e);
            e
        })?;

    log::info!("[{}] Verdict: {}", check_id, result.verdict_text);
    Ok(HttpResponse::Ok().json(result))
}
