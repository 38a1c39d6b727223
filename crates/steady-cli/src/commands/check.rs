//! Daily check command implementation

use std::path::Path;

use anyhow::Result;
use chrono::Local;

use steady_core::models::SavingsAction;
use steady_core::AgentSystem;

use super::load_state;

pub fn cmd_check(file: &Path, balance: Option<f64>, expenses: f64) -> Result<()> {
    let mut state = load_state(file, balance, Some(expenses))?;
    let agents = AgentSystem::new();

    println!("🚀 Running daily agent check...");
    println!("   Balance: {:.0}, daily expenses: {:.0}", state.balance, state.avg_daily_expenses);

    let today = Local::now().date_naive();
    let check = agents.daily_check(&mut state, today);

    let pattern = state
        .pattern
        .map(|p| p.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!("   Income pattern: {}", pattern);
    println!();

    match check.crisis {
        Some(crisis) => {
            println!(
                "🚨 CRISIS: {} severity, {:.0}% probability",
                crisis.severity,
                crisis.probability * 100.0
            );
            println!(
                "   Balance goes negative in {} days (deficit {:.0})",
                crisis.days_to_crisis, crisis.deficit
            );
            println!();
            println!("   Suggested interventions:");
            for (i, intervention) in crisis.interventions.iter().enumerate() {
                println!(
                    "   {}. {} (impact {:.0}, feasibility {:.0}%, {})",
                    i + 1,
                    intervention.action,
                    intervention.impact,
                    intervention.feasibility * 100.0,
                    intervention.timeframe
                );
                if let Some(ref warning) = intervention.warning {
                    println!("      ⚠️  {}", warning);
                }
            }
        }
        None => {
            println!("✅ No crisis detected over the next {} days", check.income_forecast.len());
            match check.savings {
                SavingsAction::Active { save, reserves } => {
                    if reserves.reserved > 0.0 {
                        println!(
                            "   Reserved {:.0} for {} upcoming bill(s); {:.0} available",
                            reserves.reserved, reserves.bills_count, reserves.available
                        );
                    }
                    match save {
                        Some(save) => println!(
                            "   💡 Save {:.0} today? Fund: {:.1}% complete",
                            save.amount, save.fund_progress
                        ),
                        None => println!("   ⏸️  Balance too low to save safely"),
                    }
                }
                SavingsAction::Paused => println!("   ⏸️  Savings paused"),
            }
        }
    }

    for advisory in &state.advisories {
        println!("   [{}] {}", advisory.severity, advisory.message);
    }

    Ok(())
}
