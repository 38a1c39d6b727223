//! Pluggable chat backend abstraction
//!
//! The coaching assistant is an externally-hosted text-completion
//! collaborator. This module provides a backend-agnostic interface over
//! it, with an OpenAI-compatible implementation (works with Groq, vLLM,
//! LocalAI, llama-server, and the hosted OpenAI API) and a mock backend
//! for testing.
//!
//! # Configuration
//!
//! Environment variables:
//! - `CHAT_BACKEND`: Backend to use (openai_compatible, mock). Default:
//!   openai_compatible
//! - `STEADY_CHAT_HOST`: Server URL (required for openai_compatible)
//! - `STEADY_CHAT_MODEL`: Model name (default: llama-3.3-70b-versatile)
//! - `STEADY_CHAT_API_KEY`: API key if the service requires one

mod mock;
mod openai_compatible;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Most recent conversation turns forwarded to the model
pub const MAX_HISTORY_MESSAGES: usize = 6;

/// One conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Trait defining the interface for chat backends
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Generate a reply given a system preamble, bounded conversation
    /// history, and the current user message
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Model name (for logging)
    fn model(&self) -> &str;

    /// Host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete chat client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ChatClient {
    OpenAICompatible(OpenAICompatibleBackend),
    Mock(MockBackend),
}

impl ChatClient {
    /// Create a chat client from environment variables
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend =
            std::env::var("CHAT_BACKEND").unwrap_or_else(|_| "openai_compatible".to_string());

        match backend.to_lowercase().as_str() {
            "openai_compatible" | "openai" | "groq" => {
                OpenAICompatibleBackend::from_env().map(ChatClient::OpenAICompatible)
            }
            "mock" => Some(ChatClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown CHAT_BACKEND, falling back to openai_compatible");
                OpenAICompatibleBackend::from_env().map(ChatClient::OpenAICompatible)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        ChatClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String> {
        match self {
            ChatClient::OpenAICompatible(b) => b.complete(system_prompt, history, message).await,
            ChatClient::Mock(b) => b.complete(system_prompt, history, message).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ChatClient::OpenAICompatible(b) => b.health_check().await,
            ChatClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            ChatClient::OpenAICompatible(b) => b.model(),
            ChatClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            ChatClient::OpenAICompatible(b) => b.host(),
            ChatClient::Mock(b) => b.host(),
        }
    }
}

/// Keep only the most recent history turns
pub(crate) fn bound_history(history: &[ChatMessage]) -> &[ChatMessage] {
    let start = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
    &history[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_client_mock() {
        let client = ChatClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = ChatClient::mock();
        assert!(client.health_check().await);
    }

    #[test]
    fn test_bound_history() {
        let history: Vec<ChatMessage> = (0..10)
            .map(|i| ChatMessage::user(format!("message {}", i)))
            .collect();
        let bounded = bound_history(&history);
        assert_eq!(bounded.len(), MAX_HISTORY_MESSAGES);
        assert_eq!(bounded[0].content, "message 4");

        let short: Vec<ChatMessage> = vec![ChatMessage::user("hello")];
        assert_eq!(bound_history(&short).len(), 1);
    }
}
