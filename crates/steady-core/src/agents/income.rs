//! Income forecaster
//!
//! Classifies a user's income variability from the coefficient of variation
//! and projects future daily income under three scenarios using a linear
//! fit over recent history. Falls back to repeating the recent average when
//! too little history exists.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::models::{
    Advisory, AdvisoryKind, AgentName, IncomePattern, MarginOfSafety, Projection, ScenarioSet,
    Severity, UserState,
};

/// Coefficient-of-variation cutoffs for pattern classification
const CV_FIXED_BELOW: f64 = 0.1;
const CV_VARIABLE_ABOVE: f64 = 0.4;

/// Most recent data points used for the linear fit
const FIT_WINDOW: usize = 30;

/// Most recent amounts averaged by the fallback projection
const FALLBACK_WINDOW: usize = 14;

/// Daily income assumed when no history exists at all
const DEFAULT_DAILY_INCOME: f64 = 1000.0;

/// Scenario bands around the base projection
const OPTIMISTIC_FACTOR: f64 = 1.2;
const PESSIMISTIC_FACTOR: f64 = 0.8;

/// Extra pessimistic re-scaling applied for variable income patterns
const VARIABLE_PESSIMISTIC_FACTOR: f64 = 0.8;

/// Narrower bands used by the fallback projection
const FALLBACK_OPTIMISTIC_FACTOR: f64 = 1.15;
const FALLBACK_PESSIMISTIC_FACTOR: f64 = 0.85;

/// A lean period is flagged when the projected average drops below this
/// fraction of the historical average
const LEAN_PERIOD_RATIO: f64 = 0.85;

/// Bills buffer for the margin-of-safety check
const SAFETY_BUFFER: f64 = 1.15;

/// Horizon (days) for the margin-of-safety pessimistic total
const SAFETY_HORIZON: usize = 30;

/// Dated-scenario multipliers served by the forecast endpoint
const SCENARIO_PESSIMISTIC: f64 = 0.7;
const SCENARIO_OPTIMISTIC: f64 = 1.3;

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Least-squares slope of `values` against their indices
fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Agent 1: classifies income patterns and projects income scenarios
#[derive(Debug, Clone, Default)]
pub struct IncomeForecaster;

impl IncomeForecaster {
    pub fn new() -> Self {
        Self
    }

    /// Classify the income pattern from the coefficient of variation of the
    /// recent income amounts. Records the pattern and a confidence level on
    /// the user state, plus a pattern advisory.
    ///
    /// Returns None when there is no income history to classify.
    pub fn classify_pattern(&self, state: &mut UserState) -> Option<IncomePattern> {
        if state.income_history.is_empty() {
            return None;
        }

        let amounts = state.recent_amounts(60);
        let m = mean(&amounts);
        let cv = if m > 0.0 { std_dev(&amounts) / m } else { 0.0 };

        let (pattern, confidence) = if cv < CV_FIXED_BELOW {
            (IncomePattern::Fixed, 0.9)
        } else if cv > CV_VARIABLE_ABOVE {
            (IncomePattern::Variable, 0.7)
        } else {
            (IncomePattern::Mixed, 0.8)
        };

        debug!(cv, pattern = pattern.as_str(), "Classified income pattern");

        state.pattern = Some(pattern);
        state.confidence = confidence;
        state.push_advisory(Advisory {
            source: AgentName::Forecaster,
            kind: AdvisoryKind::PatternDetected,
            severity: Severity::Low,
            message: pattern.advice().to_string(),
        });

        Some(pattern)
    }

    /// Project daily income for the next `days` under three scenarios.
    ///
    /// With at least 3 history points: linear fit over the most recent
    /// window (mean plus trend slope times day offset, floored at zero),
    /// with optimistic/pessimistic bands of +/-20%. Variable income
    /// patterns get the pessimistic series re-scaled down further. With
    /// fewer points the recent average is repeated with +/-15% bands.
    ///
    /// Records the projection on the user state and warns when a lean
    /// period lies ahead.
    pub fn predict_scenarios(&self, state: &mut UserState, days: usize) -> Projection {
        if state.pattern.is_none() {
            self.classify_pattern(state);
        }

        let projection = self.project(state, days);

        let amounts: Vec<f64> = state.income_history.iter().map(|r| r.amount).collect();
        if !amounts.is_empty() && !projection.is_empty() {
            let avg_predicted = mean(&projection.base);
            let avg_historical = mean(&amounts);
            if avg_predicted < avg_historical * LEAN_PERIOD_RATIO {
                state.push_advisory(Advisory {
                    source: AgentName::Forecaster,
                    kind: AdvisoryKind::LeanPeriod,
                    severity: Severity::High,
                    message: format!(
                        "Lean period ahead: projected {:.0}/day vs usual {:.0}/day",
                        avg_predicted, avg_historical
                    ),
                });
            }
        }

        state.last_projection = Some(projection.clone());
        projection
    }

    /// Pure projection from the current history and pattern, without
    /// touching the user state
    fn project(&self, state: &UserState, days: usize) -> Projection {
        let amounts: Vec<f64> = state.income_history.iter().map(|r| r.amount).collect();
        if amounts.len() < 3 {
            return self.fallback_projection(&amounts, days);
        }

        let mut projection = self.fitted_projection(&amounts, days);
        if state.pattern == Some(IncomePattern::Variable) {
            for p in &mut projection.pessimistic {
                *p = (*p * VARIABLE_PESSIMISTIC_FACTOR).max(0.0);
            }
        }
        projection
    }

    /// Linear-fit base projection with +/-20% bands
    fn fitted_projection(&self, amounts: &[f64], days: usize) -> Projection {
        let start = amounts.len().saturating_sub(FIT_WINDOW);
        let window = &amounts[start..];
        let level = mean(window);
        let slope = linear_slope(window);

        let base: Vec<f64> = (1..=days)
            .map(|i| (level + slope * i as f64).max(0.0))
            .collect();
        let optimistic = base.iter().map(|b| b * OPTIMISTIC_FACTOR).collect();
        let pessimistic = base.iter().map(|b| b * PESSIMISTIC_FACTOR).collect();

        Projection {
            base,
            optimistic,
            pessimistic,
        }
    }

    /// Repeat the recent average with +/-15% bands
    fn fallback_projection(&self, amounts: &[f64], days: usize) -> Projection {
        let level = if amounts.is_empty() {
            DEFAULT_DAILY_INCOME
        } else {
            let start = amounts.len().saturating_sub(FALLBACK_WINDOW);
            mean(&amounts[start..]).max(0.0)
        };

        debug!(level, "Using fallback income projection");

        let base = vec![level; days];
        let optimistic = base.iter().map(|b| b * FALLBACK_OPTIMISTIC_FACTOR).collect();
        let pessimistic = base
            .iter()
            .map(|b| b * FALLBACK_PESSIMISTIC_FACTOR)
            .collect();

        Projection {
            base,
            optimistic,
            pessimistic,
        }
    }

    /// Build the dated scenario set served by the forecast endpoint: the
    /// base projection scaled by fixed 0.7 / 1.0 / 1.3 multipliers, dated
    /// from the day after the last history record.
    pub fn generate_scenario_set(&self, state: &mut UserState, periods: usize) -> ScenarioSet {
        let projection = self.predict_scenarios(state, periods);

        let start = state
            .income_history
            .last()
            .map(|r| r.date + Duration::days(1))
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        let dates: Vec<NaiveDate> = (0..periods as i64)
            .map(|i| start + Duration::days(i))
            .collect();

        let scenarios = ScenarioSet {
            dates,
            pessimistic: projection.base.iter().map(|b| b * SCENARIO_PESSIMISTIC).collect(),
            optimistic: projection.base.iter().map(|b| b * SCENARIO_OPTIMISTIC).collect(),
            base: projection.base,
        };

        state.last_scenarios = Some(scenarios.clone());
        scenarios
    }

    /// Minimum-income check: upcoming bills plus a 15% buffer compared
    /// against the pessimistic 30-day projection. Emits an advisory when
    /// the pessimistic total falls short.
    pub fn margin_of_safety(&self, state: &mut UserState, today: NaiveDate) -> MarginOfSafety {
        if state.pattern.is_none() {
            self.classify_pattern(state);
        }

        let total_bills: f64 = state
            .bills_due_within(today, SAFETY_HORIZON as i64)
            .iter()
            .map(|b| b.amount)
            .sum();
        let minimum_income = total_bills * SAFETY_BUFFER;

        let projection = self.project(state, SAFETY_HORIZON);
        let pessimistic_total: f64 = projection.pessimistic.iter().sum();
        let safe = pessimistic_total >= minimum_income;

        if !safe {
            state.push_advisory(Advisory {
                source: AgentName::Forecaster,
                kind: AdvisoryKind::MarginOfSafety,
                severity: Severity::Critical,
                message: format!(
                    "Pessimistic income {:.0} falls {:.0} short of the {:.0} needed for upcoming bills",
                    pessimistic_total,
                    minimum_income - pessimistic_total,
                    minimum_income
                ),
            });
        }

        MarginOfSafety {
            minimum_income,
            pessimistic_total,
            safe,
        }
    }
}
