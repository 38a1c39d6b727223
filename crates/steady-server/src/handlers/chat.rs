//! Chat handler - coaching questions against the derived state

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{AppError, AppState, DEFAULT_USER_ID};
use steady_core::chat::{ChatBackend, ChatMessage};
use steady_core::ContextAssembler;

/// Request body for the chat endpoint
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    pub message: String,
    /// Recent conversation turns, oldest first
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

/// Response from the chat endpoint
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub success: bool,
    pub processing_time_ms: u64,
}

/// POST /api/chat - Ask the coaching assistant a question
///
/// The system preamble is assembled from the user's derived state; the
/// pipeline is run first when no check has happened yet so the assistant
/// sees fresh forecasts.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let start = Instant::now();

    if request.message.trim().is_empty() {
        return Err(AppError::bad_request("message must not be empty"));
    }

    let backend = state.chat.as_ref().ok_or_else(|| {
        AppError::bad_request(
            "Chat requires a configured backend. Set STEADY_CHAT_HOST and STEADY_CHAT_API_KEY.",
        )
    })?;

    let handle = state.store.user(&request.user_id).await;
    let system_prompt = {
        let mut user = handle.write().await;

        // Populate derived state on first contact so the preamble has
        // forecasts and crisis status to talk about
        if user.last_projection.is_none() && !user.income_history.is_empty() {
            let today = Local::now().date_naive();
            state.agents.daily_check(&mut user, today);
        }

        ContextAssembler::new(&user).assemble()
    };

    debug!(
        user_id = %request.user_id,
        history_len = request.history.len(),
        "Processing chat message"
    );

    let reply = backend
        .complete(&system_prompt, &request.history, &request.message)
        .await
        .map_err(|e| {
            error!("Chat completion failed: {}", e);
            AppError::bad_gateway(&format!("Chat backend failed: {}", e))
        })?;

    Ok(Json(ChatResponse {
        response: reply,
        success: true,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}
