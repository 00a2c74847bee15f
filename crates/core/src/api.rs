//! JSON contract of the `POST /api/evaluate` endpoint, shared by server and client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::evaluation::EvaluationResult;
use crate::schema::SchemaIssue;

pub const EVALUATE_PATH: &str = "/api/evaluate";

pub const ERR_EXTRACTION: &str = "Failed to parse JSON from model.";
pub const ERR_VALIDATION: &str = "Schema validation failed";
pub const ERR_POST_ONLY: &str = "POST only";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EvaluateRequest {
    #[serde(default)]
    pub transcript: String,
}

/// Envelope for every answer of the evaluation endpoint.
///
/// `ok: true` carries `result`; `ok: false` carries `error` plus whatever
/// diagnostics were available when the attempt failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EvaluateResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<EvaluationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_output: Option<String>,
    #[serde(rename = "parsedJSON", default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub parsed_json: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_issues: Option<Vec<SchemaIssue>>,
}

impl EvaluateResponse {
    pub fn success(result: EvaluationResult) -> Self {
        Self {
            ok: true,
            result: Some(result),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}
