//! Agent pipeline handlers: daily check, status, decision simulation

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, DEFAULT_USER_ID};
use steady_core::models::{Advisory, DailyCheck, Decision, DecisionImpact};

/// Query parameters naming the user to operate on
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

/// GET /api/agents/daily-check - Run the full agent pipeline once
///
/// Forecast -> crisis analysis -> savings, in fixed order. An active
/// crisis pauses savings for the cycle.
pub async fn daily_check(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<DailyCheck>, AppError> {
    let handle = state.store.user(&params.user_id).await;
    let mut user = handle.write().await;

    let today = Local::now().date_naive();
    let check = state.agents.daily_check(&mut user, today);

    info!(
        user_id = %params.user_id,
        crisis = check.crisis.is_some(),
        "Daily check complete"
    );

    Ok(Json(check))
}

/// Response for the agent status endpoint
#[derive(Debug, Serialize)]
pub struct AgentStatusResponse {
    pub user_id: String,
    pub income_pattern: Option<String>,
    pub crisis_active: bool,
    pub savings_mode: String,
    pub savings_balance: f64,
    pub advisories: Vec<Advisory>,
}

/// GET /api/agents/status - Last-known agent state for a user
pub async fn agent_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<AgentStatusResponse>, AppError> {
    let handle = state
        .store
        .get(&params.user_id)
        .await
        .ok_or_else(|| AppError::not_found("Unknown user"))?;
    let user = handle.read().await;

    Ok(Json(AgentStatusResponse {
        user_id: params.user_id,
        income_pattern: user.pattern.map(|p| p.to_string()),
        crisis_active: user.last_crisis.is_some(),
        savings_mode: user.savings.mode.to_string(),
        savings_balance: user.savings.fund_balance,
        advisories: user.advisories.clone(),
    }))
}

/// Request body for decision simulation
#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    pub decision: Decision,
}

/// Response for decision simulation
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SimulateResponse {
    Impact(DecisionImpact),
    NoCrisis { message: String },
}

/// POST /api/simulate - Show the impact of a decision on the crisis outlook
///
/// Re-runs the scenario analysis with the decision applied and reports
/// before/after probability, days to crisis, and deficit.
pub async fn simulate_decision(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, AppError> {
    if request.decision.amount <= 0.0 {
        return Err(AppError::bad_request("decision amount must be positive"));
    }

    let handle = state
        .store
        .get(&request.user_id)
        .await
        .ok_or_else(|| AppError::not_found("Unknown user"))?;
    let mut user = handle.write().await;

    let today = Local::now().date_naive();
    let impact = state
        .agents
        .simulate_decision(&mut user, &request.decision, today);

    match impact {
        Some(impact) => Ok(Json(SimulateResponse::Impact(impact))),
        None => Ok(Json(SimulateResponse::NoCrisis {
            message: "No crisis to simulate".to_string(),
        })),
    }
}
