pub mod dto;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use crate::error::AppError;
use crate::models::ChatEntry;

const NO_RESPONSE: &str = "No response generated from the AI";

const PERSONA: &str = "You are Tae, a friendly AI study assistant. Your responses should be:
- Written in plain text without any markdown formatting
- Use simple bullet points with dashes (-) instead of asterisks
- Use clear spacing between sections
- Avoid using special characters or mathematical symbols in text
- Write mathematical expressions in a simple, readable format
- Keep paragraphs short and well-spaced
- Use emojis to make the response more engaging and friendly
- Use short sentences and simple language that's easy to understand";

#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// `history` is oldest first and does not include `message`.
    async fn reply(&self, message: &str, history: &[ChatEntry]) -> Result<String, AppError>;
}

pub fn build_prompt(message: &str, history: &[ChatEntry]) -> String {
    let previous = history
        .iter()
        .map(|entry| format!("{}: {}", entry.role.as_str(), entry.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\nPrevious conversation:\n{}\n\nCurrent question: {}\n\nProvide a helpful response that directly addresses the user's question.",
        PERSONA, previous, message
    )
}

pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl AssistantClient for GeminiClient {
    async fn reply(&self, message: &str, history: &[ChatEntry]) -> Result<String, AppError> {
        let request_body = dto::GenerateContentRequest::from_prompt(build_prompt(message, history));
        debug!("asking {} with {} history entries", self.config.model, history.len());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to reach the AI service: {}", e)))?;

        let status = response.status();
        let body_text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let detail = serde_json::from_str::<dto::ErrorEnvelope>(&body_text)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| format!("AI service returned {}", status));
            warn!("Gemini API error {}: {}", status, detail);
            return Err(AppError::Upstream(detail));
        }

        let parsed: dto::GenerateContentResponse = serde_json::from_str(&body_text)
            .map_err(|e| AppError::Upstream(format!("Failed to parse AI response: {}", e)))?;

        parsed
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| AppError::Upstream(NO_RESPONSE.to_string()))
    }
}

/// Used when no API key is configured.
pub struct DisabledAssistant;

#[async_trait]
impl AssistantClient for DisabledAssistant {
    async fn reply(&self, _message: &str, _history: &[ChatEntry]) -> Result<String, AppError> {
        Err(AppError::ServiceUnavailable(
            "The study assistant is not configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatRole;

    fn entry(role: ChatRole, content: &str) -> ChatEntry {
        ChatEntry {
            id: 0,
            user_id: Some(1),
            role,
            content: content.to_string(),
            timestamp: String::new(),
        }
    }

    #[test]
    fn test_prompt_includes_history_in_order() {
        let history = vec![
            entry(ChatRole::User, "What is a derivative?"),
            entry(ChatRole::Assistant, "A rate of change."),
        ];
        let prompt = build_prompt("And an integral?", &history);

        assert!(prompt.starts_with("You are Tae"));
        let user_at = prompt.find("user: What is a derivative?").expect("user line");
        let assistant_at = prompt.find("assistant: A rate of change.").expect("assistant line");
        assert!(user_at < assistant_at);
        assert!(prompt.contains("Current question: And an integral?"));
    }

    #[test]
    fn test_response_text_extraction() {
        let ok: dto::GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hi there"}],"role":"model"}}]}"#,
        )
        .expect("valid json");
        assert_eq!(ok.first_text(), Some("Hi there"));

        let empty: dto::GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[]}"#).expect("valid json");
        assert_eq!(empty.first_text(), None);

        let blocked: dto::GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
                .expect("valid json");
        assert_eq!(blocked.first_text(), None);
    }

    #[tokio::test]
    async fn test_disabled_assistant() {
        let result = DisabledAssistant.reply("hello", &[]).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }
}
