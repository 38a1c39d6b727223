//! Agent pipeline - forecast, crisis detection, savings management
//!
//! Three decision components coordinated by an orchestrator that runs them
//! in a fixed order once per daily check. Data flows one way per check:
//! forecaster -> crisis detector -> savings manager; intermediate results
//! are passed explicitly and the last-known outputs live on the per-user
//! state so later components (and the chat preamble) can read them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use steady_core::agents::AgentSystem;
//!
//! let agents = AgentSystem::new();
//! let check = agents.daily_check(&mut state, today);
//! ```

pub mod crisis;
pub mod income;
pub mod savings;

pub use crisis::{CrisisDetector, CRISIS_HORIZON_DAYS};
pub use income::IncomeForecaster;
pub use savings::SavingsManager;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{DailyCheck, Decision, DecisionImpact, SavingsAction, UserState};

/// Coordinates the three agents
#[derive(Debug, Clone, Default)]
pub struct AgentSystem {
    pub forecaster: IncomeForecaster,
    pub detector: CrisisDetector,
    pub savings: SavingsManager,
}

impl AgentSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one orchestrated check: project income, look for a crisis, then
    /// let the savings manager act. An active crisis overrides savings for
    /// the cycle.
    pub fn daily_check(&self, state: &mut UserState, today: NaiveDate) -> DailyCheck {
        debug!("Running daily agent check");

        let projection = self
            .forecaster
            .predict_scenarios(state, CRISIS_HORIZON_DAYS);

        let crisis = self.detector.run_analysis(state, &projection, today);

        let savings = if crisis.is_some() {
            self.savings.activate_crisis_mode(state);
            SavingsAction::Paused
        } else {
            self.savings.resume_normal_mode(state);
            let save = self.savings.suggest_daily_save(state, today);
            let reserves = self.savings.reserve_bills(state, today);
            SavingsAction::Active { save, reserves }
        };

        // Flag when even the pessimistic projection cannot cover upcoming
        // bills; the advisory lands on the state for the status endpoint
        self.forecaster.margin_of_safety(state, today);

        DailyCheck {
            income_forecast: projection,
            crisis,
            savings,
        }
    }

    /// Run a "what if" decision through the crisis simulator
    pub fn simulate_decision(
        &self,
        state: &mut UserState,
        decision: &Decision,
        today: NaiveDate,
    ) -> Option<DecisionImpact> {
        let projection = self
            .forecaster
            .predict_scenarios(state, CRISIS_HORIZON_DAYS);
        self.detector
            .simulate_decision(state, &projection, decision, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IncomeRecord, SavingsMode};
    use chrono::Duration;

    fn state_with(amounts: &[f64], balance: f64, avg_expenses: f64) -> UserState {
        let mut state = UserState::new();
        state.set_income_history(
            amounts
                .iter()
                .enumerate()
                .map(|(i, &amount)| IncomeRecord {
                    date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + Duration::days(i as i64),
                    amount,
                })
                .collect(),
        );
        state.balance = balance;
        state.avg_daily_expenses = avg_expenses;
        state
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 20).unwrap()
    }

    #[test]
    fn test_daily_check_normal_cycle() {
        let agents = AgentSystem::new();
        let mut state = state_with(&[100.0, 100.0, 100.0], 2000.0, 50.0);

        let check = agents.daily_check(&mut state, today());
        assert!(check.crisis.is_none());
        assert_eq!(check.income_forecast.len(), CRISIS_HORIZON_DAYS);
        match check.savings {
            SavingsAction::Active { save, reserves } => {
                assert!(save.is_some());
                assert_eq!(reserves.reserved, 0.0);
                assert_eq!(reserves.available, state.balance);
            }
            SavingsAction::Paused => panic!("savings should stay active without a crisis"),
        }
        assert_eq!(state.savings.mode, SavingsMode::Normal);
    }

    #[test]
    fn test_daily_check_crisis_pauses_savings() {
        let agents = AgentSystem::new();
        let mut state = state_with(&[100.0; 10], 100.0, 400.0);

        let check = agents.daily_check(&mut state, today());
        assert!(check.crisis.is_some());
        assert!(matches!(check.savings, SavingsAction::Paused));
        assert_eq!(state.savings.mode, SavingsMode::Crisis);
        assert!(state.savings.fund_locked);
    }

    #[test]
    fn test_crisis_recovery_restores_normal_mode() {
        let agents = AgentSystem::new();
        let mut state = state_with(&[100.0; 10], 100.0, 400.0);

        agents.daily_check(&mut state, today());
        assert_eq!(state.savings.mode, SavingsMode::Crisis);

        // A windfall clears the shortfall on the next check
        state.balance = 20_000.0;
        state.avg_daily_expenses = 50.0;
        let check = agents.daily_check(&mut state, today());
        assert!(check.crisis.is_none());
        assert_eq!(state.savings.mode, SavingsMode::Normal);
        assert!(!state.savings.fund_locked);
    }

    #[test]
    fn test_simulate_decision_through_orchestrator() {
        let agents = AgentSystem::new();
        let mut state = state_with(&[100.0; 10], 200.0, 150.0);

        let impact = agents
            .simulate_decision(
                &mut state,
                &Decision {
                    kind: crate::models::DecisionKind::ExtraIncome,
                    amount: 5000.0,
                },
                today(),
            )
            .unwrap();
        assert!(impact.risk_reduced);
    }
}
