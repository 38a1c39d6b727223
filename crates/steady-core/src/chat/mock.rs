//! Mock chat backend for testing
//!
//! Returns predictable replies without a running LLM service.

use async_trait::async_trait;

use crate::error::Result;

use super::{bound_history, ChatBackend, ChatMessage};

/// Mock chat backend
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self { healthy: true }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self { healthy: false }
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String> {
        // Echo enough structure for assertions: the mock saw the preamble,
        // the bounded history, and the current message
        Ok(format!(
            "mock reply (context: {} chars, history: {} turns) to: {}",
            system_prompt.len(),
            bound_history(history).len(),
            message
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
