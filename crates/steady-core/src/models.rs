//! Core data types shared across the agent pipeline and the API

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Emergency fund goal
pub const FUND_GOAL: f64 = 10_000.0;

/// Maximum advisories retained per user (oldest dropped first)
const MAX_ADVISORIES: usize = 20;

/// A single day of income history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub date: NaiveDate,
    pub amount: f64,
}

/// An upcoming bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
}

/// Income variability classification, derived from the coefficient of
/// variation of recent income amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomePattern {
    /// Predictable income, CV below 0.1
    Fixed,
    /// Highly variable income, CV above 0.4
    Variable,
    /// Somewhere in between
    Mixed,
}

impl IncomePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomePattern::Fixed => "fixed",
            IncomePattern::Variable => "variable",
            IncomePattern::Mixed => "mixed",
        }
    }

    /// Planning advice specific to this pattern
    pub fn advice(&self) -> &'static str {
        match self {
            IncomePattern::Fixed => {
                "Predictable income detected. Crisis prevention is straightforward."
            }
            IncomePattern::Variable => {
                "High income variability. Recommend a larger emergency fund."
            }
            IncomePattern::Mixed => {
                "Mixed income pattern. Plan around the base level, save the variable portion."
            }
        }
    }
}

impl fmt::Display for IncomePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IncomePattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(IncomePattern::Fixed),
            "variable" => Ok(IncomePattern::Variable),
            "mixed" => Ok(IncomePattern::Mixed),
            _ => Err(format!("Unknown income pattern: {}", s)),
        }
    }
}

/// Crisis severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Classify from crisis probability: critical >= 0.70, high >= 0.50,
    /// medium >= 0.30, low below
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.70 {
            Severity::Critical
        } else if probability >= 0.50 {
            Severity::High
        } else if probability >= 0.30 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Three parallel daily-income projections (no calendar dates attached).
/// Used internally by the crisis detector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Projection {
    pub base: Vec<f64>,
    pub optimistic: Vec<f64>,
    pub pessimistic: Vec<f64>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }
}

/// Dated scenario set served by the forecast endpoint. Parallel series of
/// equal length; pessimistic <= base <= optimistic for every day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub dates: Vec<NaiveDate>,
    pub pessimistic: Vec<f64>,
    pub base: Vec<f64>,
    pub optimistic: Vec<f64>,
}

/// Outcome of simulating one scenario through the balance walk
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub crisis: bool,
    pub days_to_crisis: Option<u32>,
    pub deficit: f64,
}

/// A detected cash-flow crisis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisReport {
    pub detected: bool,
    /// Fraction of scenarios that crossed zero balance
    pub probability: f64,
    /// Earliest projected day the balance goes negative (1-based)
    pub days_to_crisis: u32,
    /// Shortfall magnitude on that day
    pub deficit: f64,
    pub severity: Severity,
    /// Ranked by impact x feasibility, descending
    pub interventions: Vec<Intervention>,
}

/// Kind of corrective action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionKind {
    IncomeBoost,
    UseEmergencyFund,
    ExpenseReduction,
}

impl InterventionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionKind::IncomeBoost => "income_boost",
            InterventionKind::UseEmergencyFund => "use_emergency_fund",
            InterventionKind::ExpenseReduction => "expense_reduction",
        }
    }
}

/// A suggested corrective action with estimated impact and feasibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intervention {
    #[serde(rename = "type")]
    pub kind: InterventionKind,
    pub action: String,
    /// Estimated monetary impact
    pub impact: f64,
    /// 0.0 - 1.0
    pub feasibility: f64,
    pub timeframe: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl Intervention {
    /// Ranking score: impact weighted by feasibility
    pub fn score(&self) -> f64 {
        self.impact * self.feasibility
    }
}

/// Savings manager operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsMode {
    Normal,
    Crisis,
    Paused,
}

impl SavingsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SavingsMode::Normal => "normal",
            SavingsMode::Crisis => "crisis",
            SavingsMode::Paused => "paused",
        }
    }
}

impl fmt::Display for SavingsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State owned by the savings manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsState {
    pub mode: SavingsMode,
    pub fund_balance: f64,
    pub reserved_for_bills: f64,
    pub auto_save_enabled: bool,
    /// Set while a crisis locks the emergency fund
    pub fund_locked: bool,
}

impl Default for SavingsState {
    fn default() -> Self {
        Self {
            mode: SavingsMode::Normal,
            fund_balance: 0.0,
            reserved_for_bills: 0.0,
            auto_save_enabled: false,
            fund_locked: false,
        }
    }
}

/// A suggested daily save amount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSuggestion {
    pub amount: f64,
    pub available_after: f64,
    /// Percent progress toward the emergency fund goal
    pub fund_progress: f64,
}

/// Result of reserving money for upcoming bills
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillReserves {
    pub reserved: f64,
    pub available: f64,
    pub bills_count: usize,
}

/// Savings output for one daily check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SavingsAction {
    /// Crisis override: auto-save paused for this cycle
    Paused,
    Active {
        save: Option<SaveSuggestion>,
        reserves: BillReserves,
    },
}

/// Which agent produced an advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentName {
    Forecaster,
    CrisisDetector,
    SavingsManager,
}

impl AgentName {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentName::Forecaster => "forecaster",
            AgentName::CrisisDetector => "crisis_detector",
            AgentName::SavingsManager => "savings_manager",
        }
    }
}

/// Advisory categories agents emit during a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    PatternDetected,
    LeanPeriod,
    LowAvailableBalance,
    MarginOfSafety,
}

/// A structured note from one agent, surfaced via the status endpoint and
/// the chat preamble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advisory {
    pub source: AgentName,
    pub kind: AdvisoryKind,
    pub severity: Severity,
    pub message: String,
}

/// Minimum-income check against the pessimistic projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginOfSafety {
    /// Upcoming bills plus a 15% buffer
    pub minimum_income: f64,
    pub pessimistic_total: f64,
    pub safe: bool,
}

/// A "what if" decision to run through the simulator
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Decision {
    pub kind: DecisionKind,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// One-time income boost, spread over the first week
    ExtraIncome,
    /// Monthly expense cut, applied as a daily saving
    ExpenseCut,
}

/// Crisis metrics before/after a simulated decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisSnapshot {
    pub probability: f64,
    pub days_to_crisis: Option<u32>,
    pub deficit: f64,
}

/// Impact of a simulated decision on the crisis outlook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionImpact {
    pub before: CrisisSnapshot,
    pub after: CrisisSnapshot,
    pub probability_delta: f64,
    pub risk_reduced: bool,
}

/// Aggregated output of one orchestrated daily check
#[derive(Debug, Clone, Serialize)]
pub struct DailyCheck {
    pub income_forecast: Projection,
    pub crisis: Option<CrisisReport>,
    pub savings: SavingsAction,
}

/// A frontend-facing action suggestion (forecast endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: usize,
    pub action: String,
    /// Formatted impact, e.g. "+$3200"
    pub impact: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Everything known about one user, held in process memory only
#[derive(Debug, Clone, Default)]
pub struct UserState {
    /// Income history ordered by date ascending
    pub income_history: Vec<IncomeRecord>,
    pub balance: f64,
    pub avg_daily_expenses: f64,
    pub bills: Vec<Bill>,
    /// Last classified income pattern
    pub pattern: Option<IncomePattern>,
    /// Confidence in the classification, 0.0 - 1.0
    pub confidence: f64,
    /// Last forecaster projection (crisis horizon)
    pub last_projection: Option<Projection>,
    /// Last dated scenario set (forecast endpoint)
    pub last_scenarios: Option<ScenarioSet>,
    pub last_crisis: Option<CrisisReport>,
    pub savings: SavingsState,
    pub advisories: Vec<Advisory>,
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl UserState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the income history, keeping records sorted by date, and seed
    /// balance / average expenses when they have not been set yet.
    pub fn set_income_history(&mut self, mut records: Vec<IncomeRecord>) {
        records.sort_by_key(|r| r.date);

        if self.balance == 0.0 && !records.is_empty() {
            let mean = records.iter().map(|r| r.amount).sum::<f64>() / records.len() as f64;
            // Starting buffer: roughly a work week of income
            self.balance = mean * 5.0;
        }
        if self.avg_daily_expenses == 0.0 {
            self.avg_daily_expenses = 500.0;
        }

        self.income_history = records;
        self.uploaded_at = Some(Utc::now());
    }

    /// The most recent `n` income amounts, oldest first
    pub fn recent_amounts(&self, n: usize) -> Vec<f64> {
        let start = self.income_history.len().saturating_sub(n);
        self.income_history[start..].iter().map(|r| r.amount).collect()
    }

    /// Bills due within `days` of `today`
    pub fn bills_due_within(&self, today: NaiveDate, days: i64) -> Vec<&Bill> {
        let end = today + chrono::Duration::days(days);
        self.bills
            .iter()
            .filter(|b| b.due_date >= today && b.due_date <= end)
            .collect()
    }

    /// Append an advisory, dropping the oldest past the retention cap
    pub fn push_advisory(&mut self, advisory: Advisory) {
        tracing::debug!(
            source = advisory.source.as_str(),
            message = %advisory.message,
            "Agent advisory"
        );
        self.advisories.push(advisory);
        if self.advisories.len() > MAX_ADVISORIES {
            let excess = self.advisories.len() - MAX_ADVISORIES;
            self.advisories.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_probability() {
        assert_eq!(Severity::from_probability(1.0), Severity::Critical);
        assert_eq!(Severity::from_probability(0.70), Severity::Critical);
        assert_eq!(Severity::from_probability(0.5), Severity::High);
        assert_eq!(Severity::from_probability(0.34), Severity::Medium);
        assert_eq!(Severity::from_probability(0.1), Severity::Low);
    }

    #[test]
    fn test_income_pattern_roundtrip() {
        assert_eq!(IncomePattern::Fixed.as_str(), "fixed");
        assert_eq!(
            IncomePattern::from_str("variable").unwrap(),
            IncomePattern::Variable
        );
        assert!(IncomePattern::from_str("steady").is_err());
    }

    #[test]
    fn test_set_income_history_seeds_defaults() {
        let mut state = UserState::new();
        state.set_income_history(vec![
            IncomeRecord {
                date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
                amount: 200.0,
            },
            IncomeRecord {
                date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                amount: 100.0,
            },
        ]);

        // Sorted ascending
        assert_eq!(state.income_history[0].amount, 100.0);
        // Balance seeded at mean * 5
        assert!((state.balance - 750.0).abs() < 1e-9);
        assert_eq!(state.avg_daily_expenses, 500.0);
        assert!(state.uploaded_at.is_some());
    }

    #[test]
    fn test_set_income_history_keeps_existing_balance() {
        let mut state = UserState::new();
        state.balance = 4200.0;
        state.set_income_history(vec![IncomeRecord {
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            amount: 100.0,
        }]);
        assert_eq!(state.balance, 4200.0);
    }

    #[test]
    fn test_advisory_retention_cap() {
        let mut state = UserState::new();
        for i in 0..30 {
            state.push_advisory(Advisory {
                source: AgentName::Forecaster,
                kind: AdvisoryKind::LeanPeriod,
                severity: Severity::Low,
                message: format!("advisory {}", i),
            });
        }
        assert_eq!(state.advisories.len(), 20);
        assert_eq!(state.advisories[0].message, "advisory 10");
    }

    #[test]
    fn test_bills_due_within() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut state = UserState::new();
        state.bills = vec![
            Bill {
                name: "Rent".into(),
                amount: 800.0,
                due_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            },
            Bill {
                name: "Insurance".into(),
                amount: 120.0,
                due_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            },
            Bill {
                name: "Past due".into(),
                amount: 50.0,
                due_date: NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
            },
        ];

        let due = state.bills_due_within(today, 14);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].name, "Rent");
    }

    #[test]
    fn test_intervention_score() {
        let i = Intervention {
            kind: InterventionKind::IncomeBoost,
            action: "Take 2 extra shifts".into(),
            impact: 3000.0,
            feasibility: 0.8,
            timeframe: "4 days".into(),
            warning: None,
        };
        assert!((i.score() - 2400.0).abs() < 1e-9);
    }
}
