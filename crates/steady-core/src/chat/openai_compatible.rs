//! OpenAI-compatible chat backend
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - Groq (https://api.groq.com/openai)
//! - vLLM, LocalAI, llama-server / llama.cpp
//! - The hosted OpenAI API itself

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::{bound_history, ChatBackend, ChatMessage};

/// Sampling temperature for coaching replies
const TEMPERATURE: f32 = 0.7;

/// Reply length cap; the assistant is instructed to stay short anyway
const MAX_TOKENS: u32 = 250;

/// OpenAI-compatible chat backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        let mut backend = Self::new(base_url, model);
        backend.api_key = Some(api_key.to_string());
        backend
    }

    /// Create from environment variables
    ///
    /// Required: `STEADY_CHAT_HOST`
    /// Optional: `STEADY_CHAT_MODEL` (default: llama-3.3-70b-versatile)
    /// Optional: `STEADY_CHAT_API_KEY`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("STEADY_CHAT_HOST").ok()?;
        let model = std::env::var("STEADY_CHAT_MODEL")
            .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string());
        let api_key = std::env::var("STEADY_CHAT_API_KEY").ok();

        let mut backend = Self::new(&host, &model);
        backend.api_key = api_key;
        Some(backend)
    }

    async fn chat_completion(&self, messages: Vec<ApiMessage>) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Chat(format!(
                "Chat API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Chat("No response from chat API".into()))
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[async_trait]
impl ChatBackend for OpenAICompatibleBackend {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String> {
        let mut messages = vec![ApiMessage {
            role: "system".to_string(),
            content: system_prompt.to_string(),
        }];

        for turn in bound_history(history) {
            // Only well-formed turns are forwarded
            if turn.content.is_empty() {
                continue;
            }
            match turn.role.as_str() {
                "user" | "assistant" => messages.push(ApiMessage {
                    role: turn.role.clone(),
                    content: turn.content.clone(),
                }),
                _ => {}
            }
        }

        messages.push(ApiMessage {
            role: "user".to_string(),
            content: message.to_string(),
        });

        debug!(
            model = %self.model,
            message_count = messages.len(),
            "Sending chat completion request"
        );

        self.chat_completion(messages).await
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/v1/models", self.base_url);
        let mut req = self.http_client.get(&url);
        if let Some(ref api_key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }
        match req.send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = OpenAICompatibleBackend::new("https://api.groq.com/openai/", "llama");
        assert_eq!(backend.host(), "https://api.groq.com/openai");
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: "llama-3.3-70b-versatile".to_string(),
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content: "Am I in danger?".to_string(),
            }],
            temperature: Some(0.7),
            max_tokens: Some(250),
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 250);
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "You're on track."}}
            ]
        }"#;
        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "You're on track.");
    }
}
