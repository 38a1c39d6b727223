//! Command implementations
//!
//! Each submodule implements one CLI command. Shared helpers live here.

mod chat;
mod check;
mod forecast;
mod serve;

pub use chat::cmd_chat;
pub use check::cmd_check;
pub use forecast::cmd_forecast;
pub use serve::cmd_serve;

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};

use steady_core::{import::parse_income_csv, UserState};

/// Load an income CSV into a fresh user state
///
/// Balance defaults to a week of average income (the upload endpoint's
/// seeding rule) unless one is given.
pub fn load_state(file: &Path, balance: Option<f64>, expenses: Option<f64>) -> Result<UserState> {
    let reader = File::open(file)
        .with_context(|| format!("Failed to open income file {}", file.display()))?;
    let records = parse_income_csv(reader)
        .with_context(|| format!("Failed to parse income file {}", file.display()))?;

    anyhow::ensure!(!records.is_empty(), "Income file contained no rows");

    let mut state = UserState::new();
    state.set_income_history(records);
    if let Some(balance) = balance {
        state.balance = balance;
    }
    if let Some(expenses) = expenses {
        state.avg_daily_expenses = expenses;
    }
    Ok(state)
}
