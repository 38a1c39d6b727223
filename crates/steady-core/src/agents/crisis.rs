//! Crisis detector
//!
//! Walks each income scenario through a balance-depletion simulation
//! against upcoming bills and the average daily expense. The first day the
//! simulated balance goes negative records a crisis; probability is the
//! fraction of scenarios that crossed zero. Active crises produce ranked
//! interventions.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::models::{
    CrisisReport, CrisisSnapshot, Decision, DecisionImpact, DecisionKind, IncomePattern,
    Intervention, InterventionKind, Projection, ScenarioOutcome, Severity, UserState,
};

/// Simulation horizon in days
pub const CRISIS_HORIZON_DAYS: usize = 14;

/// Bills considered "upcoming" within this window
const BILL_WINDOW_DAYS: i64 = 14;

/// Assumed value of one extra shift
const SHIFT_VALUE: f64 = 1500.0;

/// Fraction of daily expenses treated as cuttable
const CUTTABLE_EXPENSE_RATIO: f64 = 0.2;

/// Days an income-boost decision is spread over
const BOOST_SPREAD_DAYS: usize = 7;

/// Days an expense-cut decision is amortized over
const CUT_AMORTIZE_DAYS: f64 = 30.0;

/// Agent 2: monitors scenarios for balance depletion and proposes
/// interventions
#[derive(Debug, Clone, Default)]
pub struct CrisisDetector;

impl CrisisDetector {
    pub fn new() -> Self {
        Self
    }

    /// Run all three scenarios through the balance simulation and build a
    /// crisis report. Returns None (and clears any previous crisis) when no
    /// scenario crosses zero.
    pub fn run_analysis(
        &self,
        state: &mut UserState,
        projection: &Projection,
        today: NaiveDate,
    ) -> Option<CrisisReport> {
        let total_bills: f64 = state
            .bills_due_within(today, BILL_WINDOW_DAYS)
            .iter()
            .map(|b| b.amount)
            .sum();

        let outcomes = [
            self.simulate_scenario(
                &projection.pessimistic,
                state.balance,
                total_bills,
                state.avg_daily_expenses,
            ),
            self.simulate_scenario(
                &projection.base,
                state.balance,
                total_bills,
                state.avg_daily_expenses,
            ),
            self.simulate_scenario(
                &projection.optimistic,
                state.balance,
                total_bills,
                state.avg_daily_expenses,
            ),
        ];

        let crises = outcomes.iter().filter(|o| o.crisis).count();
        let probability = crises as f64 / outcomes.len() as f64;

        if crises == 0 {
            debug!("No scenario crossed zero balance");
            state.last_crisis = None;
            return None;
        }

        // Earliest crisis day and its deficit
        let earliest = outcomes
            .iter()
            .filter(|o| o.crisis)
            .min_by_key(|o| o.days_to_crisis.unwrap_or(u32::MAX))?;
        let days_to_crisis = earliest.days_to_crisis.unwrap_or(0);
        let deficit = earliest.deficit;
        let severity = Severity::from_probability(probability);

        let interventions = self.generate_interventions(state, deficit);

        info!(
            probability,
            days_to_crisis,
            deficit,
            severity = severity.as_str(),
            "Crisis detected"
        );

        let report = CrisisReport {
            detected: true,
            probability,
            days_to_crisis,
            deficit,
            severity,
            interventions,
        };
        state.last_crisis = Some(report.clone());
        Some(report)
    }

    /// Walk one income stream day by day: balance accrues the day's income
    /// and loses the average daily expense plus an even share of upcoming
    /// bills. The first negative day is the crisis day.
    fn simulate_scenario(
        &self,
        income_stream: &[f64],
        balance: f64,
        total_bills: f64,
        avg_expenses: f64,
    ) -> ScenarioOutcome {
        if income_stream.is_empty() {
            return ScenarioOutcome {
                crisis: false,
                days_to_crisis: None,
                deficit: 0.0,
            };
        }

        let per_day_bills = total_bills / income_stream.len() as f64;
        let mut current = balance;

        for (idx, income) in income_stream.iter().enumerate() {
            current += income;
            current -= avg_expenses;
            current -= per_day_bills;

            if current < 0.0 {
                return ScenarioOutcome {
                    crisis: true,
                    days_to_crisis: Some(idx as u32 + 1),
                    deficit: -current,
                };
            }
        }

        ScenarioOutcome {
            crisis: false,
            days_to_crisis: None,
            deficit: 0.0,
        }
    }

    /// Build interventions for the given deficit, ranked by
    /// impact x feasibility descending
    fn generate_interventions(&self, state: &UserState, deficit: f64) -> Vec<Intervention> {
        let mut interventions = Vec::new();

        // Gig workers with variable income can pick up extra shifts
        if state.pattern == Some(IncomePattern::Variable) {
            let shifts = (deficit / SHIFT_VALUE) as u32 + 1;
            interventions.push(Intervention {
                kind: InterventionKind::IncomeBoost,
                action: format!("Take {} extra shifts", shifts),
                impact: shifts as f64 * SHIFT_VALUE,
                feasibility: 0.8,
                timeframe: format!("{} days", shifts * 2),
                warning: None,
            });
        }

        let fund = state.savings.fund_balance;
        if fund > 0.0 {
            interventions.push(Intervention {
                kind: InterventionKind::UseEmergencyFund,
                action: format!("Use emergency fund ({:.0} available)", fund),
                impact: fund.min(deficit),
                feasibility: 1.0,
                timeframe: "Instant".to_string(),
                warning: Some("Will deplete emergency fund".to_string()),
            });
        }

        let cuttable =
            (state.avg_daily_expenses * CUTTABLE_EXPENSE_RATIO * CRISIS_HORIZON_DAYS as f64)
                .min(deficit);
        if cuttable > 0.0 {
            interventions.push(Intervention {
                kind: InterventionKind::ExpenseReduction,
                action: "Cut non-essential spending".to_string(),
                impact: cuttable,
                feasibility: 0.7,
                timeframe: "Immediate".to_string(),
                warning: None,
            });
        }

        interventions.sort_by(|a, b| {
            b.score()
                .partial_cmp(&a.score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        interventions
    }

    /// Re-simulate with a candidate decision applied and report the impact
    /// on the crisis outlook. Returns None when there is no active crisis
    /// to simulate against.
    pub fn simulate_decision(
        &self,
        state: &mut UserState,
        projection: &Projection,
        decision: &Decision,
        today: NaiveDate,
    ) -> Option<DecisionImpact> {
        let before = self.run_analysis(state, projection, today)?;

        let mut adjusted = projection.clone();
        let mut avg_expenses = state.avg_daily_expenses;
        match decision.kind {
            DecisionKind::ExtraIncome => {
                // One-time boost spread across the first week
                let per_day = decision.amount / BOOST_SPREAD_DAYS as f64;
                for series in [
                    &mut adjusted.pessimistic,
                    &mut adjusted.base,
                    &mut adjusted.optimistic,
                ] {
                    for v in series.iter_mut().take(BOOST_SPREAD_DAYS) {
                        *v += per_day;
                    }
                }
            }
            DecisionKind::ExpenseCut => {
                // Monthly cut lands as a daily saving
                avg_expenses = (avg_expenses - decision.amount / CUT_AMORTIZE_DAYS).max(0.0);
            }
        }

        let total_bills: f64 = state
            .bills_due_within(today, BILL_WINDOW_DAYS)
            .iter()
            .map(|b| b.amount)
            .sum();
        let outcomes = [
            self.simulate_scenario(&adjusted.pessimistic, state.balance, total_bills, avg_expenses),
            self.simulate_scenario(&adjusted.base, state.balance, total_bills, avg_expenses),
            self.simulate_scenario(&adjusted.optimistic, state.balance, total_bills, avg_expenses),
        ];
        let crises = outcomes.iter().filter(|o| o.crisis).count();
        let after_probability = crises as f64 / outcomes.len() as f64;
        let after_earliest = outcomes
            .iter()
            .filter(|o| o.crisis)
            .min_by_key(|o| o.days_to_crisis.unwrap_or(u32::MAX));

        let after = CrisisSnapshot {
            probability: after_probability,
            days_to_crisis: after_earliest.and_then(|o| o.days_to_crisis),
            deficit: after_earliest.map(|o| o.deficit).unwrap_or(0.0),
        };

        Some(DecisionImpact {
            probability_delta: after.probability - before.probability,
            risk_reduced: before.probability > after.probability,
            before: CrisisSnapshot {
                probability: before.probability,
                days_to_crisis: Some(before.days_to_crisis),
                deficit: before.deficit,
            },
            after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::income::IncomeForecaster;
    use crate::models::{Bill, IncomeRecord};
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
    fn test_steady_income_no_crisis() {
        // Income 100/day, expenses 50/day, comfortable starting balance
        let mut state = state_with(&[100.0, 100.0, 100.0], 500.0, 50.0);
        let forecaster = IncomeForecaster::new();
        let detector = CrisisDetector::new();

        let projection = forecaster.predict_scenarios(&mut state, CRISIS_HORIZON_DAYS);
        let crisis = detector.run_analysis(&mut state, &projection, today());
        assert!(crisis.is_none());
        assert!(state.last_crisis.is_none());
    }

    #[test]
    fn test_outflow_exceeding_inflow_detects_crisis() {
        let mut state = state_with(&[100.0; 10], 200.0, 400.0);
        let forecaster = IncomeForecaster::new();
        let detector = CrisisDetector::new();

        let projection = forecaster.predict_scenarios(&mut state, CRISIS_HORIZON_DAYS);
        let crisis = detector.run_analysis(&mut state, &projection, today()).unwrap();
        assert!(crisis.detected);
        assert!(crisis.probability > 0.0);
        assert!(crisis.days_to_crisis >= 1);
        assert!(crisis.deficit > 0.0);
        assert!(state.last_crisis.is_some());
    }

    #[test]
    fn test_probability_counts_crossing_scenarios() {
        let detector = CrisisDetector::new();
        let state = state_with(&[100.0; 5], 1000.0, 100.0);

        // Hand-built projection: only the pessimistic scenario depletes
        // (zero income against 100/day expenses goes negative on day 11)
        let projection = Projection {
            pessimistic: vec![0.0; 14],
            base: vec![200.0; 14],
            optimistic: vec![400.0; 14],
        };
        let mut one_crossing = state.clone();
        let crisis = detector
            .run_analysis(&mut one_crossing, &projection, today())
            .unwrap();
        assert!((crisis.probability - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(crisis.days_to_crisis, 11);

        // Base depleting too raises the probability monotonically
        let projection2 = Projection {
            pessimistic: vec![0.0; 14],
            base: vec![20.0; 14],
            optimistic: vec![400.0; 14],
        };
        let mut two_crossings = state.clone();
        let crisis2 = detector
            .run_analysis(&mut two_crossings, &projection2, today())
            .unwrap();
        assert!((crisis2.probability - 2.0 / 3.0).abs() < 1e-9);
        assert!(crisis2.probability > crisis.probability);
    }

    #[test]
    fn test_interventions_sorted_by_score() {
        let mut state = state_with(&[100.0, 900.0, 50.0, 1200.0, 80.0, 700.0], 100.0, 600.0);
        state.savings.fund_balance = 2000.0;
        let forecaster = IncomeForecaster::new();
        let detector = CrisisDetector::new();

        let projection = forecaster.predict_scenarios(&mut state, CRISIS_HORIZON_DAYS);
        let crisis = detector.run_analysis(&mut state, &projection, today()).unwrap();

        assert!(crisis.interventions.len() >= 2);
        for pair in crisis.interventions.windows(2) {
            assert!(pair[0].score() >= pair[1].score());
        }
    }

    #[test]
    fn test_variable_pattern_gets_shift_suggestion() {
        let mut state = state_with(&[100.0, 900.0, 50.0, 1200.0, 80.0, 700.0], 100.0, 600.0);
        let forecaster = IncomeForecaster::new();
        let detector = CrisisDetector::new();

        let projection = forecaster.predict_scenarios(&mut state, CRISIS_HORIZON_DAYS);
        let crisis = detector.run_analysis(&mut state, &projection, today()).unwrap();

        let boost = crisis
            .interventions
            .iter()
            .find(|i| i.kind == InterventionKind::IncomeBoost)
            .expect("variable pattern should suggest extra shifts");
        // Impact is a whole number of shifts
        assert_eq!(boost.impact % SHIFT_VALUE, 0.0);
        assert!(boost.impact >= crisis.deficit);
    }

    #[test]
    fn test_emergency_fund_intervention_capped_at_deficit() {
        let detector = CrisisDetector::new();
        let mut state = state_with(&[100.0; 5], 0.0, 0.0);
        state.savings.fund_balance = 50_000.0;

        let interventions = detector.generate_interventions(&state, 1234.0);
        let fund = interventions
            .iter()
            .find(|i| i.kind == InterventionKind::UseEmergencyFund)
            .unwrap();
        assert_eq!(fund.impact, 1234.0);
        assert!(fund.warning.is_some());
    }

    #[test]
    fn test_bills_accelerate_crisis() {
        let mut state = state_with(&[100.0; 10], 600.0, 100.0);
        state.bills = vec![Bill {
            name: "Rent".into(),
            amount: 7000.0,
            due_date: today() + Duration::days(5),
        }];
        let forecaster = IncomeForecaster::new();
        let detector = CrisisDetector::new();

        let projection = forecaster.predict_scenarios(&mut state, CRISIS_HORIZON_DAYS);
        let crisis = detector.run_analysis(&mut state, &projection, today()).unwrap();
        // 7000 spread over 14 days = 500/day on top of expenses
        assert_eq!(crisis.probability, 1.0);
        assert_eq!(crisis.severity, Severity::Critical);
        assert!(crisis.days_to_crisis <= 2);
    }

    #[test]
    fn test_empty_projection_is_no_crisis() {
        let detector = CrisisDetector::new();
        let outcome = detector.simulate_scenario(&[], 100.0, 0.0, 50.0);
        assert!(!outcome.crisis);
        assert_eq!(outcome.deficit, 0.0);
    }

    #[test]
    fn test_simulate_decision_extra_income_reduces_risk() {
        let mut state = state_with(&[100.0; 10], 200.0, 150.0);
        let forecaster = IncomeForecaster::new();
        let detector = CrisisDetector::new();

        let projection = forecaster.predict_scenarios(&mut state, CRISIS_HORIZON_DAYS);
        let impact = detector
            .simulate_decision(
                &mut state,
                &projection,
                &Decision {
                    kind: DecisionKind::ExtraIncome,
                    amount: 5000.0,
                },
                today(),
            )
            .expect("baseline state should be in crisis");

        assert!(impact.before.probability > 0.0);
        assert!(impact.after.probability < impact.before.probability);
        assert!(impact.risk_reduced);
        assert!(impact.probability_delta < 0.0);
    }

    #[test]
    fn test_simulate_decision_without_crisis() {
        let mut state = state_with(&[100.0, 100.0, 100.0], 5000.0, 50.0);
        let forecaster = IncomeForecaster::new();
        let detector = CrisisDetector::new();

        let projection = forecaster.predict_scenarios(&mut state, CRISIS_HORIZON_DAYS);
        let impact = detector.simulate_decision(
            &mut state,
            &projection,
            &Decision {
                kind: DecisionKind::ExpenseCut,
                amount: 300.0,
            },
            today(),
        );
        assert!(impact.is_none());
    }
}
