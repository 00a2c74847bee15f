//! HTTP client for the pitchsense evaluation endpoint.

use pitchsense_core::api::{EvaluateRequest, EvaluateResponse, EVALUATE_PATH};
use pitchsense_core::EvaluationResult;
use reqwest::StatusCode;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server could not be reached or answered with something other
    /// than an evaluation envelope.
    #[error("evaluation request failed: {0}")]
    Transport(String),

    /// The server ran the evaluation and reported a structured failure.
    #[error("{}", .0.error.as_deref().unwrap_or("evaluation failed"))]
    Evaluation(Box<EvaluateResponse>),
}

pub struct ServerClient {
    base_url: String,
    http: reqwest::Client,
}

impl ServerClient {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::new();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a transcript and return the validated result.
    pub async fn evaluate(&self, transcript: &str) -> Result<EvaluationResult, ClientError> {
        let url = format!("{}{}", self.base_url, EVALUATE_PATH);
        debug!(%url, chars = transcript.len(), "Submitting transcript");

        let resp = self
            .http
            .post(&url)
            .json(&EvaluateRequest {
                transcript: transcript.to_string(),
            })
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("server not reachable at {url}: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ClientError::Transport(format!("failed to read response: {e}")))?;

        interpret(status, &body)
    }
}

/// Map a raw endpoint answer onto the client's outcome.
///
/// Any body that parses as an envelope is trusted regardless of status;
/// failure statuses carry structured diagnostics.
fn interpret(status: StatusCode, body: &str) -> Result<EvaluationResult, ClientError> {
    let envelope: EvaluateResponse = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) => {
            return Err(ClientError::Transport(format!(
                "server returned {status}: {}",
                body.trim()
            )))
        }
    };

    match envelope {
        EvaluateResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        EvaluateResponse { ok: true, .. } => Err(ClientError::Transport(format!(
            "server returned {status} without a result"
        ))),
        failure => Err(ClientError::Evaluation(Box::new(failure))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchsense_core::api::ERR_EXTRACTION;
    use serde_json::json;

    #[test]
    fn success_envelope_yields_result() {
        let body = json!({ "ok": true, "result": { "score": 0.75, "verdict": "Strong pitch" } });
        let result = interpret(StatusCode::OK, &body.to_string()).unwrap();
        assert_eq!(result.score, Some(0.75));
        assert_eq!(result.verdict.as_deref(), Some("Strong pitch"));
    }

    #[test]
    fn structured_failure_keeps_diagnostics() {
        let body = json!({ "ok": false, "error": ERR_EXTRACTION, "modelOutput": "no json" });
        let err = interpret(StatusCode::INTERNAL_SERVER_ERROR, &body.to_string()).unwrap_err();
        match &err {
            ClientError::Evaluation(resp) => {
                assert_eq!(resp.model_output.as_deref(), Some("no json"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.to_string(), ERR_EXTRACTION);
    }

    #[test]
    fn non_envelope_body_is_transport_error() {
        let err = interpret(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ClientError::Transport(ref m) if m.contains("502")));
    }

    #[test]
    fn ok_without_result_is_transport_error() {
        let err = interpret(StatusCode::OK, r#"{"ok":true}"#).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ServerClient::new("http://localhost:3001/");
        assert_eq!(client.base_url(), "http://localhost:3001");
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let client = ServerClient::new("http://127.0.0.1:1");
        let err = client.evaluate("hello").await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
