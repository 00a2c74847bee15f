//! POST /api/evaluate: score a pitch transcript with the configured model.
//!
//! Failures are answered with `ok: false` payloads rather than bare status
//! codes so the caller can show the raw model output and schema issues.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pitchsense_core::api::{
    EvaluateRequest, EvaluateResponse, ERR_EXTRACTION, ERR_POST_ONLY, ERR_VALIDATION,
};
use pitchsense_llm::EvaluationError;
use tracing::{error, warn};

use crate::state::AppState;

type Reply = (StatusCode, Json<EvaluateResponse>);

/// Evaluate one transcript. Every answer, including a rejected body, is an
/// `EvaluateResponse` envelope.
#[utoipa::path(
    post,
    path = "/api/evaluate",
    tag = "Evaluation",
    request_body = EvaluateRequest,
    responses(
        (status = 200, description = "Validated evaluation result", body = EvaluateResponse),
        (status = 400, description = "Body is not a JSON object", body = EvaluateResponse),
        (status = 405, description = "Method other than POST", body = EvaluateResponse),
        (status = 409, description = "Another evaluation is in progress", body = EvaluateResponse),
        (status = 415, description = "Missing JSON content type", body = EvaluateResponse),
        (status = 500, description = "Model call, JSON extraction or schema validation failed", body = EvaluateResponse),
        (status = 503, description = "Model backend not configured", body = EvaluateResponse)
    )
)]
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Reply {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(status = %rejection.status(), "evaluate body rejected: {}", rejection.body_text());
            return (
                rejection.status(),
                Json(EvaluateResponse::failure(rejection.body_text())),
            );
        }
    };

    let Some(evaluator) = state.evaluator.as_ref() else {
        let reason = state
            .unavailable_reason
            .clone()
            .unwrap_or_else(|| "LLM provider not configured.".into());
        warn!("evaluate called but the model backend is not configured: {reason}");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(EvaluateResponse::failure(reason)),
        );
    };

    match evaluator.evaluate(&req.transcript).await {
        Ok(result) => (StatusCode::OK, Json(EvaluateResponse::success(result))),
        Err(e) => failure_reply(e),
    }
}

fn failure_reply(err: EvaluationError) -> Reply {
    match err {
        EvaluationError::Invocation(e) => {
            error!("Eval error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(EvaluateResponse::failure(e.to_string())),
            )
        }
        EvaluationError::Extraction { model_output } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(EvaluateResponse {
                model_output: Some(model_output),
                ..EvaluateResponse::failure(ERR_EXTRACTION)
            }),
        ),
        EvaluationError::Validation {
            model_output,
            parsed,
            issues,
        } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(EvaluateResponse {
                model_output: Some(model_output),
                parsed_json: Some(parsed),
                schema_issues: Some(issues),
                ..EvaluateResponse::failure(ERR_VALIDATION)
            }),
        ),
        busy @ EvaluationError::Busy => (
            StatusCode::CONFLICT,
            Json(EvaluateResponse::failure(busy.to_string())),
        ),
    }
}

/// Any method other than POST on the evaluation route.
pub async fn post_only() -> Reply {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(EvaluateResponse::failure(ERR_POST_ONLY)),
    )
}
