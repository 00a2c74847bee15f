use std::sync::atomic::{AtomicBool, Ordering};

use pitchsense_core::EvaluationResult;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::extract::extract_json_object;
use crate::prompt::build_prompt;
use crate::provider::{LlmError, LlmProvider, Message};
use crate::validate::{validate_result, SchemaIssue};

/// Sampling temperature for evaluations; fixed so repeated runs agree.
pub const EVAL_TEMPERATURE: f32 = 0.0;

/// Output-token ceiling for one evaluation reply.
pub const EVAL_MAX_TOKENS: u32 = 700;

/// Turns a transcript into a validated [`EvaluationResult`] via an LLM.
///
/// Pipeline: build prompt → invoke model → extract JSON → validate. Each step
/// short-circuits the rest. At most one evaluation runs at a time; an
/// overlapping call is refused with [`EvaluationError::Busy`] instead of
/// being queued.
pub struct EvaluationService {
    provider: Box<dyn LlmProvider>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the evaluation ends, on every exit path.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EvaluationService {
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self {
            provider,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Build from config, creating the appropriate provider.
    pub fn from_config(llm_config: &pitchsense_core::config::LlmConfig) -> Result<Self, LlmError> {
        let provider = crate::providers::create_provider(llm_config)?;
        Ok(Self::new(provider))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// True while an evaluation is waiting on the model.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn evaluate(&self, transcript: &str) -> Result<EvaluationResult, EvaluationError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            warn!("evaluation refused: another one is in flight");
            return Err(EvaluationError::Busy);
        };

        let prompt = build_prompt(transcript);
        info!(
            provider = self.provider.name(),
            transcript_chars = transcript.chars().count(),
            "Evaluating pitch transcript"
        );

        let model_output = self
            .provider
            .complete(vec![Message::user(prompt)], EVAL_TEMPERATURE, EVAL_MAX_TOKENS)
            .await
            .map_err(EvaluationError::Invocation)?;

        debug!("raw model output:\n{}", model_output);

        let Some(parsed) = extract_json_object(&model_output) else {
            warn!(output_chars = model_output.len(), "no JSON object in model output");
            return Err(EvaluationError::Extraction { model_output });
        };

        debug!("parsed JSON: {}", parsed);

        match validate_result(&parsed) {
            Ok(result) => {
                info!(score = ?result.score, "Evaluation complete");
                Ok(result)
            }
            Err(issues) => {
                warn!(issues = issues.len(), "model JSON failed schema validation");
                Err(EvaluationError::Validation {
                    model_output,
                    parsed,
                    issues,
                })
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("{0}")]
    Invocation(LlmError),
    #[error("Failed to parse JSON from model.")]
    Extraction { model_output: String },
    #[error("Schema validation failed")]
    Validation {
        model_output: String,
        parsed: Value,
        issues: Vec<SchemaIssue>,
    },
    #[error("An evaluation is already in progress.")]
    Busy,
}

impl EvaluationError {
    /// Raw model text, present for every failure after the model answered.
    pub fn model_output(&self) -> Option<&str> {
        match self {
            EvaluationError::Extraction { model_output }
            | EvaluationError::Validation { model_output, .. } => Some(model_output),
            EvaluationError::Invocation(_) | EvaluationError::Busy => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::JsonKind;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Replies with a fixed text and records what it was asked.
    struct ScriptedProvider {
        reply: Result<String, u16>,
        calls: Arc<AtomicUsize>,
        seen: std::sync::Mutex<Vec<(String, f32, u32)>>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedProvider {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
                seen: std::sync::Mutex::new(Vec::new()),
                gate: None,
            }
        }

        fn failing(status: u16) -> Self {
            Self { reply: Err(status), ..Self::replying("") }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(
            &self,
            messages: Vec<Message>,
            temperature: f32,
            max_tokens: u32,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let prompt = messages.into_iter().map(|m| m.content).collect::<String>();
            self.seen.lock().unwrap().push((prompt, temperature, max_tokens));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::ApiError {
                    status: *status,
                    body: "upstream down".into(),
                }),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn prose_wrapped_json_is_accepted() {
        let text = "Sure! Here is the JSON:\n{\"score\":0.75,\"category_scores\":{\"clarity\":0.8,\"depth\":0.6,\"structure\":0.9},\"insights\":[\"Good energy\"],\"verdict\":\"Strong pitch\"}\nLet me know if you need more.";
        let service = EvaluationService::new(Box::new(ScriptedProvider::replying(text)));

        let result = service.evaluate("Hi, I'm Alex...").await.unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "score": 0.75,
                "category_scores": { "clarity": 0.8, "depth": 0.6, "structure": 0.9 },
                "insights": ["Good energy"],
                "verdict": "Strong pitch"
            })
        );
    }

    #[tokio::test]
    async fn prose_without_braces_is_an_extraction_error() {
        let text = "I think this pitch is pretty good overall.";
        let service = EvaluationService::new(Box::new(ScriptedProvider::replying(text)));

        let err = service.evaluate("pitch").await.unwrap_err();

        match &err {
            EvaluationError::Extraction { model_output } => assert_eq!(model_output, text),
            other => panic!("expected extraction error, got {other:?}"),
        }
        assert_eq!(err.to_string(), "Failed to parse JSON from model.");
    }

    #[tokio::test]
    async fn wrong_type_is_a_validation_error() {
        let text = r#"{"score":"high"}"#;
        let service = EvaluationService::new(Box::new(ScriptedProvider::replying(text)));

        let err = service.evaluate("pitch").await.unwrap_err();

        match err {
            EvaluationError::Validation { model_output, parsed, issues } => {
                assert_eq!(model_output, text);
                assert_eq!(parsed, json!({ "score": "high" }));
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].path, "score");
                assert_eq!(issues[0].expected, JsonKind::Number);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn upstream_failure_is_an_invocation_error() {
        let service = EvaluationService::new(Box::new(ScriptedProvider::failing(502)));

        let err = service.evaluate("pitch").await.unwrap_err();

        assert!(matches!(
            err,
            EvaluationError::Invocation(LlmError::ApiError { status: 502, .. })
        ));
        assert!(err.model_output().is_none());
    }

    #[tokio::test]
    async fn model_is_called_once_per_evaluation() {
        let provider = ScriptedProvider::replying("{}");
        let calls = provider.calls.clone();
        let service = EvaluationService::new(Box::new(provider));

        service.evaluate("deck ```rm -rf``` end").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn prompt_and_sampling_settings_reach_the_provider() {
        let provider = Arc::new(ScriptedProvider::replying("{}"));

        struct Shared(Arc<ScriptedProvider>);

        #[async_trait]
        impl LlmProvider for Shared {
            async fn complete(
                &self,
                messages: Vec<Message>,
                temperature: f32,
                max_tokens: u32,
            ) -> Result<String, LlmError> {
                self.0.complete(messages, temperature, max_tokens).await
            }

            fn name(&self) -> &str {
                self.0.name()
            }
        }

        let service = EvaluationService::new(Box::new(Shared(provider.clone())));
        service.evaluate("deck ```x``` end").await.unwrap();

        let seen = provider.seen.lock().unwrap();
        let (prompt, temperature, max_tokens) = &seen[0];
        assert_eq!(*temperature, EVAL_TEMPERATURE);
        assert_eq!(*max_tokens, EVAL_MAX_TOKENS);
        assert!(prompt.contains("deck 'x' end"));
    }

    #[tokio::test]
    async fn overlapping_call_is_refused() {
        let gate = Arc::new(Notify::new());
        let mut provider = ScriptedProvider::replying(r#"{"score":0.5}"#);
        provider.gate = Some(gate.clone());
        let calls = provider.calls.clone();
        let service = Arc::new(EvaluationService::new(Box::new(provider)));

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.evaluate("first").await })
        };

        while calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(service.is_busy());

        let second = service.evaluate("second").await;
        assert!(matches!(second, Err(EvaluationError::Busy)));

        gate.notify_one();
        let first = first.await.unwrap().unwrap();
        assert_eq!(first.score, Some(0.5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!service.is_busy());
    }

    #[tokio::test]
    async fn sequential_calls_are_independent() {
        let service =
            EvaluationService::new(Box::new(ScriptedProvider::replying(r#"{"verdict":"ok"}"#)));
        for _ in 0..3 {
            let result = service.evaluate("again").await.unwrap();
            assert_eq!(result.verdict.as_deref(), Some("ok"));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn busy_polling_never_refuses_sequential_calls() {
        let service = Arc::new(EvaluationService::new(Box::new(ScriptedProvider::replying(
            r#"{"score":0.1}"#,
        ))));
        let stop = Arc::new(AtomicBool::new(false));

        let poller = {
            let service = service.clone();
            let stop = stop.clone();
            std::thread::spawn(move || {
                let mut polls = 0u64;
                while !stop.load(Ordering::Relaxed) {
                    std::hint::black_box(service.is_busy());
                    polls += 1;
                }
                polls
            })
        };

        let mut refused = 0;
        for _ in 0..5_000 {
            if let Err(EvaluationError::Busy) = service.evaluate("x").await {
                refused += 1;
            }
        }
        stop.store(true, Ordering::Relaxed);
        let polls = poller.join().unwrap();

        assert_eq!(refused, 0);
        assert!(polls > 0);
        assert!(!service.is_busy());
    }

    #[tokio::test]
    async fn failed_call_releases_the_slot() {
        let service = EvaluationService::new(Box::new(ScriptedProvider::failing(500)));
        assert!(service.evaluate("a").await.is_err());
        assert!(!service.is_busy());
        assert!(matches!(
            service.evaluate("b").await,
            Err(EvaluationError::Invocation(_))
        ));
    }
}
