//! Integration tests for steady-core
//!
//! These tests exercise the full import -> forecast -> crisis -> savings
//! workflow the way the server drives it.

use chrono::NaiveDate;

use steady_core::{
    agents::{AgentSystem, CRISIS_HORIZON_DAYS},
    import::parse_income_csv,
    models::{IncomePattern, SavingsAction, SavingsMode},
    ContextAssembler, UserState,
};

/// Two weeks of steady delivery income
fn steady_income_csv() -> &'static str {
    r#"date,income
2026-01-01,400
2026-01-02,400
2026-01-03,400
2026-01-04,400
2026-01-05,400
2026-01-06,400
2026-01-07,400
2026-01-08,400
2026-01-09,400
2026-01-10,400
2026-01-11,400
2026-01-12,400
2026-01-13,400
2026-01-14,400"#
}

/// Two weeks of swingy ride-share income
fn variable_income_csv() -> &'static str {
    r#"date,income
2026-01-01,900
2026-01-02,120
2026-01-03,1400
2026-01-04,60
2026-01-05,800
2026-01-06,150
2026-01-07,1100
2026-01-08,90
2026-01-09,950
2026-01-10,200
2026-01-11,1250
2026-01-12,80
2026-01-13,700
2026-01-14,300"#
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

#[test]
fn test_full_check_workflow_healthy_user() {
    let records = parse_income_csv(steady_income_csv().as_bytes()).expect("Failed to parse CSV");
    assert_eq!(records.len(), 14);

    let mut state = UserState::new();
    state.set_income_history(records);
    // Balance seeded at mean * 5
    assert!((state.balance - 2000.0).abs() < 1e-9);

    // Comfortable margins: expenses well under income
    state.avg_daily_expenses = 200.0;

    let agents = AgentSystem::new();
    let check = agents.daily_check(&mut state, today());

    assert_eq!(state.pattern, Some(IncomePattern::Fixed));
    assert!(check.crisis.is_none());
    assert_eq!(check.income_forecast.len(), CRISIS_HORIZON_DAYS);

    // Flat history means a flat forecast
    for b in &check.income_forecast.base {
        assert!((b - 400.0).abs() < 1e-6);
    }

    match check.savings {
        SavingsAction::Active { save, reserves } => {
            let save = save.expect("healthy user should get a save suggestion");
            // 10% of available is above the cap
            assert_eq!(save.amount, 100.0);
            assert_eq!(reserves.reserved, 0.0);
        }
        SavingsAction::Paused => panic!("no crisis, savings must stay active"),
    }
}

#[test]
fn test_full_check_workflow_struggling_user() {
    let records = parse_income_csv(variable_income_csv().as_bytes()).unwrap();

    let mut state = UserState::new();
    state.set_income_history(records);
    state.balance = 300.0;
    state.avg_daily_expenses = 800.0;

    let agents = AgentSystem::new();
    let check = agents.daily_check(&mut state, today());

    assert_eq!(state.pattern, Some(IncomePattern::Variable));

    let crisis = check.crisis.expect("outflows dwarf inflows");
    assert!(crisis.probability > 0.0);
    assert!(!crisis.interventions.is_empty());
    // Ranked by impact x feasibility, descending
    for pair in crisis.interventions.windows(2) {
        assert!(pair[0].impact * pair[0].feasibility >= pair[1].impact * pair[1].feasibility);
    }

    assert!(matches!(check.savings, SavingsAction::Paused));
    assert_eq!(state.savings.mode, SavingsMode::Crisis);

    // The chat preamble reflects the detected crisis
    let preamble = ContextAssembler::new(&state).assemble();
    assert!(preamble.contains("CRISIS DETECTED: Yes"));
    assert!(preamble.contains("Income pattern detected: variable"));
}

#[test]
fn test_scenario_set_ordering_from_csv() {
    let records = parse_income_csv(variable_income_csv().as_bytes()).unwrap();
    let mut state = UserState::new();
    state.set_income_history(records);

    let agents = AgentSystem::new();
    let scenarios = agents.forecaster.generate_scenario_set(&mut state, 90);

    assert_eq!(scenarios.dates.len(), 90);
    assert_eq!(scenarios.dates[0], NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    for i in 0..90 {
        assert!(scenarios.pessimistic[i] <= scenarios.base[i] + 1e-9);
        assert!(scenarios.base[i] <= scenarios.optimistic[i] + 1e-9);
    }
}
