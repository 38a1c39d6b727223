//! Forecast generation handler

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, DEFAULT_USER_ID};
use steady_core::agents::CRISIS_HORIZON_DAYS;
use steady_core::models::{
    CrisisReport, IncomeRecord, Intervention, ScenarioSet, Suggestion,
};

/// Default forecast length in days
const DEFAULT_PERIODS: usize = 90;

/// Forecast periods above this are rejected
const MAX_PERIODS: usize = 365;

/// Suggestions surfaced to the frontend per forecast
const MAX_SUGGESTIONS: usize = 5;

/// Request body for forecast generation
#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    pub periods: Option<usize>,
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

/// Agent-derived context returned alongside the scenarios
#[derive(Debug, Serialize)]
pub struct AgentInsights {
    pub income_pattern: Option<String>,
    pub confidence: f64,
}

/// Forecast metadata
#[derive(Debug, Serialize)]
pub struct ForecastMetadata {
    pub forecast_days: usize,
    pub generated_at: DateTime<Utc>,
}

/// Response for forecast generation
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub scenarios: ScenarioSet,
    pub suggestions: Vec<Suggestion>,
    pub activity: Vec<IncomeRecord>,
    pub crisis: Option<CrisisReport>,
    pub agent_insights: AgentInsights,
    pub metadata: ForecastMetadata,
}

/// POST /api/forecast/generate - Project three income futures
///
/// Produces the dated scenario set, ranked action suggestions, recent
/// activity, and the current crisis outlook for one user.
pub async fn generate_forecast(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForecastRequest>,
) -> Result<Json<ForecastResponse>, AppError> {
    let periods = request.periods.unwrap_or(DEFAULT_PERIODS);
    if periods == 0 || periods > MAX_PERIODS {
        return Err(AppError::bad_request(&format!(
            "periods must be between 1 and {}",
            MAX_PERIODS
        )));
    }

    let handle = state
        .store
        .get(&request.user_id)
        .await
        .ok_or_else(|| AppError::not_found("No income history for user"))?;
    let mut user = handle.write().await;

    if user.income_history.is_empty() {
        return Err(AppError::not_found("No income history for user"));
    }

    info!(user_id = %request.user_id, periods, "Generating forecast");

    let today = Local::now().date_naive();
    let agents = &state.agents;

    // 1) Dated scenario set over the requested horizon
    let scenarios = agents.forecaster.generate_scenario_set(&mut user, periods);

    // 2) Crisis outlook over the standard detection horizon
    let projection = agents
        .forecaster
        .predict_scenarios(&mut user, CRISIS_HORIZON_DAYS);
    let crisis = agents.detector.run_analysis(&mut user, &projection, today);

    // 3) Action suggestions: ranked interventions, or optimization
    //    defaults when nothing is wrong
    let suggestions = match crisis {
        Some(ref crisis) => intervention_suggestions(&crisis.interventions),
        None => default_suggestions(),
    };

    // 4) Recent activity for the dashboard
    let start = user.income_history.len().saturating_sub(7);
    let activity: Vec<IncomeRecord> = user.income_history[start..].to_vec();

    let insights = AgentInsights {
        income_pattern: user.pattern.map(|p| p.to_string()),
        confidence: user.confidence,
    };

    Ok(Json(ForecastResponse {
        metadata: ForecastMetadata {
            forecast_days: scenarios.dates.len(),
            generated_at: Utc::now(),
        },
        scenarios,
        suggestions,
        activity,
        crisis,
        agent_insights: insights,
    }))
}

/// Map ranked interventions onto frontend suggestions
fn intervention_suggestions(interventions: &[Intervention]) -> Vec<Suggestion> {
    interventions
        .iter()
        .take(MAX_SUGGESTIONS)
        .enumerate()
        .map(|(idx, intervention)| Suggestion {
            id: idx + 1,
            action: intervention.action.clone(),
            impact: format!("+{:.0}", intervention.impact),
            kind: intervention.kind.as_str().to_string(),
        })
        .collect()
}

/// Optimization suggestions shown when no crisis is active
fn default_suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion {
            id: 1,
            action: "Take 2 extra shifts this week".to_string(),
            impact: "+3200".to_string(),
            kind: "income".to_string(),
        },
        Suggestion {
            id: 2,
            action: "Skip dining out (5 days)".to_string(),
            impact: "+1500".to_string(),
            kind: "expense".to_string(),
        },
        Suggestion {
            id: 3,
            action: "Reduce entertainment budget".to_string(),
            impact: "+800".to_string(),
            kind: "expense".to_string(),
        },
    ]
}
