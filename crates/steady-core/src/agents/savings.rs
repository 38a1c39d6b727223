//! Savings manager
//!
//! In normal mode, proposes a safe daily save amount and reserves money
//! for bills due soon. When the crisis detector signals, switches to a
//! defensive mode: auto-save paused, emergency fund locked.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::models::{
    Advisory, AdvisoryKind, AgentName, BillReserves, SaveSuggestion, SavingsMode, Severity,
    UserState, FUND_GOAL,
};

/// Fraction of available balance proposed for saving
const SAVE_RATIO: f64 = 0.10;

/// Hard cap on the daily save amount
const SAVE_CAP: f64 = 100.0;

/// No save is proposed below this available balance
const MIN_AVAILABLE_TO_SAVE: f64 = 500.0;

/// Bills due within this window get reserved
const BILL_RESERVE_WINDOW_DAYS: i64 = 14;

/// Available balance below this after reservation triggers a warning
const LOW_BALANCE_FLOOR: f64 = 2000.0;

/// Agent 3: guards savings and bill money
#[derive(Debug, Clone, Default)]
pub struct SavingsManager;

impl SavingsManager {
    pub fn new() -> Self {
        Self
    }

    /// Switch to defensive mode on a crisis signal: pause auto-save and
    /// lock the emergency fund
    pub fn activate_crisis_mode(&self, state: &mut UserState) {
        info!(
            fund_balance = state.savings.fund_balance,
            "Savings manager entering crisis mode"
        );
        state.savings.mode = SavingsMode::Crisis;
        state.savings.auto_save_enabled = false;
        state.savings.fund_locked = true;
    }

    /// Return to normal mode once no crisis is active
    pub fn resume_normal_mode(&self, state: &mut UserState) {
        if state.savings.mode != SavingsMode::Normal {
            debug!("Savings manager resuming normal mode");
        }
        state.savings.mode = SavingsMode::Normal;
        state.savings.fund_locked = false;
    }

    /// Propose a daily save amount: 10% of the available balance, capped,
    /// and never past the emergency fund goal. Skipped during a crisis or
    /// when the available balance is too low to save safely.
    pub fn suggest_daily_save(&self, state: &UserState, today: NaiveDate) -> Option<SaveSuggestion> {
        if state.last_crisis.is_some() {
            debug!("Skipping save suggestion (crisis active)");
            return None;
        }

        let reserved = self.bill_reserve_total(state, today);
        let available = state.balance - reserved;

        if available < MIN_AVAILABLE_TO_SAVE {
            debug!(available, "Balance too low to save safely");
            return None;
        }

        let remaining_to_goal = (FUND_GOAL - state.savings.fund_balance).max(0.0);
        let amount = (available * SAVE_RATIO).min(SAVE_CAP).min(remaining_to_goal);
        let fund_progress = state.savings.fund_balance / FUND_GOAL * 100.0;

        Some(SaveSuggestion {
            amount,
            available_after: available - amount,
            fund_progress,
        })
    }

    /// Reserve money for bills due within the next two weeks. With zero
    /// upcoming bills the reservation is zero and the full balance stays
    /// available. A low post-reservation balance produces an advisory.
    pub fn reserve_bills(&self, state: &mut UserState, today: NaiveDate) -> BillReserves {
        let due = state.bills_due_within(today, BILL_RESERVE_WINDOW_DAYS);
        let reserved: f64 = due.iter().map(|b| b.amount).sum();
        let bills_count = due.len();

        state.savings.reserved_for_bills = reserved;
        let available = state.balance - reserved;

        if bills_count > 0 && available < LOW_BALANCE_FLOOR {
            state.push_advisory(Advisory {
                source: AgentName::SavingsManager,
                kind: AdvisoryKind::LowAvailableBalance,
                severity: Severity::Medium,
                message: format!(
                    "Only {:.0} available after reserving {:.0} for bills",
                    available, reserved
                ),
            });
        }

        BillReserves {
            reserved,
            available,
            bills_count,
        }
    }

    fn bill_reserve_total(&self, state: &UserState, today: NaiveDate) -> f64 {
        state
            .bills_due_within(today, BILL_RESERVE_WINDOW_DAYS)
            .iter()
            .map(|b| b.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bill, CrisisReport};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    fn crisis_report() -> CrisisReport {
        CrisisReport {
            detected: true,
            probability: 1.0,
            days_to_crisis: 3,
            deficit: 500.0,
            severity: Severity::Critical,
            interventions: vec![],
        }
    }

    #[test]
    fn test_save_suggestion_ratio_and_cap() {
        let manager = SavingsManager::new();
        let mut state = UserState::new();
        state.balance = 800.0;

        // 10% of 800 is below the cap
        let save = manager.suggest_daily_save(&state, today()).unwrap();
        assert!((save.amount - 80.0).abs() < 1e-9);
        assert!((save.available_after - 720.0).abs() < 1e-9);

        // Large balance hits the cap
        state.balance = 50_000.0;
        let save = manager.suggest_daily_save(&state, today()).unwrap();
        assert_eq!(save.amount, 100.0);
    }

    #[test]
    fn test_save_never_overshoots_goal() {
        let manager = SavingsManager::new();
        let mut state = UserState::new();
        state.balance = 50_000.0;
        state.savings.fund_balance = 9_960.0;

        let save = manager.suggest_daily_save(&state, today()).unwrap();
        assert!((save.amount - 40.0).abs() < 1e-9);
        assert!((save.fund_progress - 99.6).abs() < 1e-9);
    }

    #[test]
    fn test_no_save_below_minimum_available() {
        let manager = SavingsManager::new();
        let mut state = UserState::new();
        state.balance = 400.0;
        assert!(manager.suggest_daily_save(&state, today()).is_none());
    }

    #[test]
    fn test_no_save_during_crisis() {
        let manager = SavingsManager::new();
        let mut state = UserState::new();
        state.balance = 5000.0;
        state.last_crisis = Some(crisis_report());
        assert!(manager.suggest_daily_save(&state, today()).is_none());
    }

    #[test]
    fn test_reserves_subtracted_from_available() {
        let manager = SavingsManager::new();
        let mut state = UserState::new();
        state.balance = 3000.0;
        state.bills = vec![Bill {
            name: "Rent".into(),
            amount: 2_800.0,
            due_date: today() + chrono::Duration::days(3),
        }];

        let save = manager.suggest_daily_save(&state, today());
        // 3000 - 2800 reserved leaves only 200 available
        assert!(save.is_none());
    }

    #[test]
    fn test_zero_bills_zero_reserve() {
        let manager = SavingsManager::new();
        let mut state = UserState::new();
        state.balance = 1234.0;

        let reserves = manager.reserve_bills(&mut state, today());
        assert_eq!(reserves.reserved, 0.0);
        assert_eq!(reserves.available, 1234.0);
        assert_eq!(reserves.bills_count, 0);
        assert_eq!(state.savings.reserved_for_bills, 0.0);
    }

    #[test]
    fn test_bill_reserve_window() {
        let manager = SavingsManager::new();
        let mut state = UserState::new();
        state.balance = 10_000.0;
        state.bills = vec![
            Bill {
                name: "Rent".into(),
                amount: 900.0,
                due_date: today() + chrono::Duration::days(10),
            },
            Bill {
                name: "Annual insurance".into(),
                amount: 1200.0,
                due_date: today() + chrono::Duration::days(40),
            },
        ];

        let reserves = manager.reserve_bills(&mut state, today());
        assert_eq!(reserves.reserved, 900.0);
        assert_eq!(reserves.bills_count, 1);
        assert_eq!(reserves.available, 9_100.0);
    }

    #[test]
    fn test_low_balance_advisory() {
        let manager = SavingsManager::new();
        let mut state = UserState::new();
        state.balance = 2_000.0;
        state.bills = vec![Bill {
            name: "Rent".into(),
            amount: 1_500.0,
            due_date: today() + chrono::Duration::days(2),
        }];

        manager.reserve_bills(&mut state, today());
        assert!(state
            .advisories
            .iter()
            .any(|a| a.kind == AdvisoryKind::LowAvailableBalance));
    }

    #[test]
    fn test_crisis_mode_pauses_and_locks() {
        let manager = SavingsManager::new();
        let mut state = UserState::new();
        state.savings.auto_save_enabled = true;

        manager.activate_crisis_mode(&mut state);
        assert_eq!(state.savings.mode, SavingsMode::Crisis);
        assert!(!state.savings.auto_save_enabled);
        assert!(state.savings.fund_locked);

        manager.resume_normal_mode(&mut state);
        assert_eq!(state.savings.mode, SavingsMode::Normal);
        assert!(!state.savings.fund_locked);
    }
}
