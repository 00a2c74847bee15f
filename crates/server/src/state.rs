use pitchsense_llm::EvaluationService;

pub struct AppState {
    /// `None` when the model backend is misconfigured; the endpoint then answers 503.
    pub evaluator: Option<EvaluationService>,
    pub llm_provider: String,
    /// Why the evaluator could not be built, reported to callers verbatim.
    pub unavailable_reason: Option<String>,
}

impl AppState {
    pub fn ready(evaluator: EvaluationService) -> Self {
        Self {
            llm_provider: evaluator.provider_name().to_string(),
            evaluator: Some(evaluator),
            unavailable_reason: None,
        }
    }

    pub fn unavailable(llm_provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            evaluator: None,
            llm_provider: llm_provider.into(),
            unavailable_reason: Some(reason.into()),
        }
    }
}
