//! Forecast command implementation

use std::path::Path;

use anyhow::Result;

use steady_core::AgentSystem;

use super::load_state;

pub fn cmd_forecast(file: &Path, periods: usize) -> Result<()> {
    anyhow::ensure!(periods > 0, "periods must be positive");

    let mut state = load_state(file, None, None)?;
    let agents = AgentSystem::new();

    let scenarios = agents.forecaster.generate_scenario_set(&mut state, periods);

    let pattern = state
        .pattern
        .map(|p| p.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("📊 Forecast from {} days of income history", state.income_history.len());
    println!("   Income pattern: {} (confidence {:.0}%)", pattern, state.confidence * 100.0);
    println!("   Horizon: {} days ({} to {})", periods, scenarios.dates[0], scenarios.dates[periods - 1]);
    println!();

    let avg = |series: &[f64]| series.iter().sum::<f64>() / series.len() as f64;
    println!("   📉 Pessimistic avg: {:.0}/day", avg(&scenarios.pessimistic));
    println!("   📊 Base avg:        {:.0}/day", avg(&scenarios.base));
    println!("   📈 Optimistic avg:  {:.0}/day", avg(&scenarios.optimistic));

    for advisory in &state.advisories {
        println!();
        println!("   ⚠️  {}", advisory.message);
    }

    Ok(())
}
