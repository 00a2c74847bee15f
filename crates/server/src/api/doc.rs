//! OpenAPI documentation aggregator, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "pitchsense API",
        version = "0.1.0",
        description = "Scores pitch transcripts for clarity, depth and structure with an LLM.",
    ),
    tags(
        (name = "Health", description = "Server readiness and model backend status"),
        (name = "Evaluation", description = "Pitch transcript evaluation"),
    ),
    paths(
        crate::api::health::health,
        crate::api::evaluate::evaluate,
    ),
    components(schemas(
        crate::api::health::HealthResponse,
        pitchsense_core::api::EvaluateRequest,
        pitchsense_core::api::EvaluateResponse,
        pitchsense_core::EvaluationResult,
        pitchsense_core::CategoryScores,
        pitchsense_core::SchemaIssue,
        pitchsense_core::JsonKind,
    ))
)]
pub struct ApiDoc;
