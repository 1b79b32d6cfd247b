//! Chat-completion API client
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint. Only the
//! pieces this service needs are modeled: one system message, one user
//! message, an optional JSON-schema response constraint, and the first
//! choice's text content.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const USER_AGENT: &str = concat!("castlist/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat client errors
#[derive(Debug, Error)]
pub enum ChatClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Completion response contained no content")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Chat-completion API client
pub struct ChatClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Create a client for the given endpoint
    ///
    /// `endpoint` is the full URL of the chat-completions route.
    pub fn new(endpoint: String, api_key: String, model: String) -> Result<Self, ChatClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ChatClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            api_key,
            model,
        })
    }

    /// Request a free-text completion
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, ChatClientError> {
        self.request(system, user, None).await
    }

    /// Request a completion constrained to the given JSON schema
    pub async fn complete_json(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: Value,
    ) -> Result<String, ChatClientError> {
        let format = serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema_name,
                "schema": schema,
            }
        });

        self.request(system, user, Some(format)).await
    }

    async fn request(
        &self,
        system: &str,
        user: &str,
        response_format: Option<Value>,
    ) -> Result<String, ChatClientError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format,
        };

        tracing::debug!(model = %self.model, "Querying chat-completion API");

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatClientError::Network(e.to_string()))?;

        let status = response.status();

        if status == 401 {
            return Err(ChatClientError::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChatClientError::Api(status.as_u16(), error_text));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ChatClientError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ChatClientError::EmptyResponse)?;

        tracing::debug!(chars = content.len(), "Chat completion received");

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ChatClient::new(
            "https://example.invalid/v1/chat/completions".to_string(),
            "test_key".to_string(),
            "test-model".to_string(),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_response_format_omitted_when_absent() {
        let body = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "system",
                content: "s",
            }],
            response_format: None,
        };

        let json = serde_json::to_value(&body).expect("serialize");
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_content_extraction_shape() {
        let raw = r#"{"choices": [{"message": {"content": "hello"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).expect("parse");
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        assert_eq!(content.as_deref(), Some("hello"));
    }
}
