pub mod claude;
pub mod ollama;
pub mod openai;

use pitchsense_core::config::LlmConfig;

use crate::provider::{LlmError, LlmProvider};

/// Create the appropriate LLM provider based on config.
///
/// A missing credential or model identifier is reported as
/// `LlmError::NotConfigured`; callers treat that as an operational problem.
pub fn create_provider(llm_config: &LlmConfig) -> Result<Box<dyn LlmProvider>, LlmError> {
    let model = llm_config
        .model
        .clone()
        .ok_or_else(|| LlmError::NotConfigured("AI_MODEL not set".into()))?;

    match llm_config.provider.as_str() {
        "openrouter" => {
            let api_key = llm_config
                .openrouter_api_key
                .clone()
                .ok_or_else(|| LlmError::NotConfigured("OPENROUTER_API_KEY not set".into()))?;
            Ok(Box::new(openai::OpenAiProvider::openrouter(
                api_key,
                model,
                llm_config.openrouter_base_url.clone(),
            )))
        }
        "openai" => {
            let api_key = llm_config
                .openai_api_key
                .clone()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            Ok(Box::new(openai::OpenAiProvider::new(
                api_key,
                model,
                llm_config.openai_base_url.clone(),
            )))
        }
        "anthropic" | "claude" => {
            let api_key = llm_config
                .anthropic_api_key
                .clone()
                .ok_or_else(|| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".into()))?;
            Ok(Box::new(claude::ClaudeProvider::new(api_key, model)))
        }
        "ollama" => Ok(Box::new(ollama::OllamaProvider::new(
            llm_config.ollama_url.clone(),
            model,
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}
