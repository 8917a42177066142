//! OpenAI-compatible chat completions (OpenRouter by default).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{ChatMessage, CompletionProvider};
use crate::error::ProviderError;
use crate::http::fetch_json;

pub struct OpenRouterProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenRouterProvider {
    pub fn new(client: Client, base_url: &str, api_key: String, model: String) -> Self {
        let endpoint = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        tracing::info!(endpoint = %endpoint, model = %model, "Creating completion provider");
        Self {
            client,
            endpoint,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            messages = messages.len(),
            "Sending completion request"
        );

        let body = json!({
            "model": self.model,
            "messages": messages,
            "n": 1,
            "stream": false
        });
        let request = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body);

        let response: CompletionResponse = fetch_json(request, &self.endpoint).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyCompletion)?;

        tracing::debug!(chars = content.chars().count(), "Completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenRouterProvider {
        OpenRouterProvider::new(
            Client::new(),
            &server.uri(),
            "or-key".into(),
            "openai/gpt-3.5-turbo".into(),
        )
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer or-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "openai/gpt-3.5-turbo",
                "n": 1,
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "что делать вечером"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "1. Прогулка"}},
                    {"message": {"role": "assistant", "content": "ignored"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider(&server)
            .complete(&[
                ChatMessage::system("be brief"),
                ChatMessage::user("что делать вечером"),
            ])
            .await
            .unwrap();
        assert_eq!(text, "1. Прогулка");
    }

    #[tokio::test]
    async fn test_no_choices_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_quota_error_is_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(402).set_body_json(serde_json::json!({
                "error": {"message": "Insufficient credits"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        match err {
            ProviderError::Status { status, body, .. } => {
                assert_eq!(status, 402);
                assert!(body.contains("Insufficient credits"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
