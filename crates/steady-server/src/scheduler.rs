//! Background scheduler for periodic agent re-checks
//!
//! Provides optional scheduled re-evaluation that can be enabled via
//! environment variables:
//!
//! - `STEADY_CHECK_SCHEDULE`: Interval in hours (e.g., "24" for daily)
//!
//! The scheduler runs in the background and re-runs the agent pipeline
//! for every user currently held in memory, so crisis detection does not
//! depend on the user hitting an endpoint.

use std::time::Duration;

use chrono::Local;
use tokio::time::interval;
use tracing::{info, warn};

use steady_core::{AgentSystem, UserStore};

/// Configuration for scheduled re-checks
#[derive(Debug, Clone)]
pub struct CheckScheduleConfig {
    /// Interval between checks in hours
    pub interval_hours: u64,
}

impl CheckScheduleConfig {
    /// Parse configuration from environment variables
    ///
    /// Returns None if scheduling is not configured (STEADY_CHECK_SCHEDULE
    /// not set)
    pub fn from_env() -> Option<Self> {
        let interval_hours: u64 = std::env::var("STEADY_CHECK_SCHEDULE")
            .ok()
            .and_then(|s| s.parse().ok())?;

        if interval_hours == 0 {
            warn!("STEADY_CHECK_SCHEDULE is 0, automatic re-checks disabled");
            return None;
        }

        Some(Self { interval_hours })
    }
}

/// Start the re-check scheduler as a background task
///
/// This function spawns a tokio task that runs indefinitely, re-running
/// the agent pipeline at the configured interval.
pub fn start_check_scheduler(store: UserStore, config: CheckScheduleConfig) {
    info!(
        "Starting re-check scheduler: every {} hours",
        config.interval_hours
    );

    tokio::spawn(async move {
        let agents = AgentSystem::new();
        let mut ticker = interval(Duration::from_secs(config.interval_hours * 3600));

        // Skip the first immediate tick - nothing to check at startup
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let user_ids = store.user_ids().await;
            info!(users = user_ids.len(), "Running scheduled agent checks");

            for user_id in user_ids {
                let handle = store.user(&user_id).await;
                let mut user = handle.write().await;
                if user.income_history.is_empty() {
                    continue;
                }

                let today = Local::now().date_naive();
                let check = agents.daily_check(&mut user, today);

                if let Some(crisis) = check.crisis {
                    warn!(
                        user_id = %user_id,
                        probability = crisis.probability,
                        days_to_crisis = crisis.days_to_crisis,
                        severity = crisis.severity.as_str(),
                        "Scheduled check detected a crisis"
                    );
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_not_set() {
        // When STEADY_CHECK_SCHEDULE is not set, should return None
        std::env::remove_var("STEADY_CHECK_SCHEDULE");
        assert!(CheckScheduleConfig::from_env().is_none());
    }

    #[test]
    fn test_config_from_env_zero() {
        // When STEADY_CHECK_SCHEDULE is 0, should return None
        std::env::set_var("STEADY_CHECK_SCHEDULE", "0");
        assert!(CheckScheduleConfig::from_env().is_none());
        std::env::remove_var("STEADY_CHECK_SCHEDULE");
    }
}
