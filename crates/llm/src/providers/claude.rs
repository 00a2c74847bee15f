use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::{LlmError, LlmProvider, Message, Role};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<TurnMessage<'a>>,
}

#[derive(Serialize)]
struct TurnMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

/// Claude takes system text as a top-level field; everything else is a turn.
fn split_system(messages: &[Message]) -> (Option<String>, Vec<TurnMessage<'_>>) {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();
    let turns = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| TurnMessage { role: m.role.as_str(), content: &m.content })
        .collect();
    let system = if system.is_empty() { None } else { Some(system.join("\n\n")) };
    (system, turns)
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let (system, turns) = split_system(&messages);
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            temperature,
            system,
            messages: turns,
        };

        debug!(model = %self.model, "Claude request to {}", MESSAGES_URL);

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status: status.as_u16(), body });
        }

        let resp: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("invalid messages body: {e}")))?;

        let text: String = resp.content.into_iter().filter_map(|b| b.text).collect();
        if text.is_empty() {
            return Err(LlmError::ParseError("no text blocks in response".into()));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_messages_are_lifted_out_of_turns() {
        let messages = vec![Message::system("be terse"), Message::user("evaluate this")];
        let (system, turns) = split_system(&messages);
        assert_eq!(system.as_deref(), Some("be terse"));
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, "user");
    }

    #[test]
    fn single_user_prompt_has_no_system_field() {
        let messages = vec![Message::user("prompt")];
        let (system, turns) = split_system(&messages);
        let body = serde_json::to_value(MessagesRequest {
            model: "claude-sonnet-4-5",
            max_tokens: 700,
            temperature: 0.0,
            system,
            messages: turns,
        })
        .unwrap();
        assert!(body.get("system").is_none());
        assert_eq!(body["messages"][0]["content"], "prompt");
    }
}
