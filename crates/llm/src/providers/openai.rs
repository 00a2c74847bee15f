//! OpenAI-compatible chat completions backend.
//!
//! Serves both OpenAI itself and OpenRouter, which exposes the same
//! `/v1/chat/completions` contract under a different base URL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::{LlmError, LlmProvider, Message};

pub struct OpenAiProvider {
    client: reqwest::Client,
    label: &'static str,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self::with_label("openai", api_key, model, base_url)
    }

    /// OpenRouter speaks the OpenAI wire format.
    pub fn openrouter(api_key: String, model: String, base_url: String) -> Self {
        Self::with_label("openrouter", api_key, model, base_url)
    }

    fn with_label(label: &'static str, api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            label,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| ChatMessage { role: m.role.as_str(), content: &m.content })
                .collect(),
            temperature,
            max_tokens,
        };

        debug!(backend = self.label, model = %self.model, "chat completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status: status.as_u16(), body });
        }

        let resp: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("invalid chat completion body: {e}")))?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::ParseError("missing choices[0].message.content".into()))
    }

    fn name(&self) -> &str {
        self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Role;

    #[test]
    fn request_body_matches_chat_completions_contract() {
        let messages = [Message::user("hello")];
        let request = ChatRequest {
            model: "openai/gpt-4o-mini",
            messages: messages
                .iter()
                .map(|m| ChatMessage { role: m.role.as_str(), content: &m.content })
                .collect(),
            temperature: 0.0,
            max_tokens: 700,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "openai/gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], Role::User.as_str());
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["max_tokens"], 700);
    }

    #[test]
    fn response_without_choices_parses_to_empty() {
        let resp: ChatResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(resp.choices.is_empty());
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let p = OpenAiProvider::openrouter("k".into(), "m".into(), "https://openrouter.ai/api/".into());
        assert_eq!(p.base_url, "https://openrouter.ai/api");
        assert_eq!(p.name(), "openrouter");
    }
}
