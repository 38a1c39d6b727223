//! Context Assembler
//!
//! Builds the system preamble for the chat assistant from a user's derived
//! state: income statistics, forecast totals, crisis status, savings
//! state, and recent agent advisories. The assistant is instructed to base
//! its advice solely on this data.

use std::fmt::Write;

use crate::models::{UserState, FUND_GOAL};

/// How many recent income days appear in the preamble detail
const RECENT_DAYS: usize = 7;

/// How many recent income days feed the summary statistics
const STATS_WINDOW: usize = 14;

/// Role and behavior instructions for the assistant
const ROLE_PROMPT: &str = "\
You are Steady, an expert, empathetic financial coach for gig workers.

Role & behavior:
- Be warm, supportive and non-judgmental.
- Be practical: offer concise, actionable steps the user can actually do.
- Keep answers short (under 100 words) and easy to act on.
- If data is missing, explicitly state which data is missing and ask for it.
- If a financial crisis is detected, acknowledge it calmly and give 2-3 prioritized, concrete interventions.
- If safe, suggest one small immediate action and one structural action (example: start auto-saving a small daily amount).
- When possible, show quick estimates of the effect of an action on the balance.
- Always base your advice solely on the data provided below; do not invent facts.
";

/// Closing instructions appended after the data section
const INSTRUCTIONS: &str = "
INSTRUCTIONS TO THE ASSISTANT:
- Answer in plain English; be empathetic and practical.
- Provide 1 immediate action and up to 2 prioritized next steps.
- Use approximate numbers when useful (prefix with \"~\" if estimated).
- If you cannot compute due to missing data, ask for the specific data needed.
- Keep the tone hopeful and focused on what the user can do right now.
- Reference the actual income data shown above when giving advice.
";

/// Assembles the chat system prompt from per-user derived state
pub struct ContextAssembler<'a> {
    state: &'a UserState,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(state: &'a UserState) -> Self {
        Self { state }
    }

    /// Render the full system preamble: role, data section, instructions
    pub fn assemble(&self) -> String {
        let mut out = String::from(ROLE_PROMPT);
        out.push_str("\nUSER FINANCIAL DATA (real):\n");
        self.write_income_section(&mut out);
        self.write_forecast_section(&mut out);
        self.write_crisis_section(&mut out);
        self.write_savings_section(&mut out);
        self.write_advisories_section(&mut out);
        out.push_str(INSTRUCTIONS);
        out
    }

    fn write_income_section(&self, out: &mut String) {
        let history = &self.state.income_history;
        if history.is_empty() {
            out.push_str("- No income data uploaded yet.\n");
        } else {
            let start = history.len().saturating_sub(STATS_WINDOW);
            let recent = &history[start..];
            let total: f64 = recent.iter().map(|r| r.amount).sum();
            let avg = total / recent.len() as f64;
            let max = recent.iter().map(|r| r.amount).fold(f64::MIN, f64::max);
            let min = recent.iter().map(|r| r.amount).fold(f64::MAX, f64::min);

            let _ = writeln!(out, "\n- UPLOADED INCOME DATA ({} days total):", history.len());
            let _ = writeln!(
                out,
                "  - Date range: {} to {}",
                history.first().unwrap().date,
                history.last().unwrap().date
            );
            let _ = writeln!(out, "  - Average daily income: {:.0}", avg);
            let _ = writeln!(out, "  - Highest day: {:.0}", max);
            let _ = writeln!(out, "  - Lowest day: {:.0}", min);
            let _ = writeln!(out, "  - Total (last {} days): {:.0}", recent.len(), total);

            let detail_start = history.len().saturating_sub(RECENT_DAYS);
            let _ = writeln!(
                out,
                "  - Last {} days breakdown:",
                history.len() - detail_start
            );
            for record in &history[detail_start..] {
                let _ = writeln!(out, "    - {}: {:.0}", record.date, record.amount);
            }
        }

        let _ = writeln!(
            out,
            "\n- Current estimated balance: {:.0}",
            self.state.balance
        );
        let _ = writeln!(
            out,
            "- Average daily expenses: {:.0}",
            self.state.avg_daily_expenses
        );
    }

    fn write_forecast_section(&self, out: &mut String) {
        let Some(ref projection) = self.state.last_projection else {
            return;
        };

        let pattern = self
            .state
            .pattern
            .map(|p| p.as_str())
            .unwrap_or("unknown");
        let _ = writeln!(out, "\n- Income pattern detected: {}", pattern);
        let _ = writeln!(
            out,
            "- Next {} days income forecast (totals):",
            projection.len()
        );
        let _ = writeln!(
            out,
            "  - Optimistic: {:.0}",
            projection.optimistic.iter().sum::<f64>()
        );
        let _ = writeln!(
            out,
            "  - Realistic:  {:.0}",
            projection.base.iter().sum::<f64>()
        );
        let _ = writeln!(
            out,
            "  - Pessimistic: {:.0}",
            projection.pessimistic.iter().sum::<f64>()
        );
    }

    fn write_crisis_section(&self, out: &mut String) {
        out.push_str("\n- Crisis status:\n");
        match self.state.last_crisis {
            Some(ref crisis) => {
                out.push_str("  - CRISIS DETECTED: Yes\n");
                let _ = writeln!(out, "  - Days to crisis: {}", crisis.days_to_crisis);
                let _ = writeln!(out, "  - Projected deficit: {:.0}", crisis.deficit);
                let _ = writeln!(out, "  - Probability: {:.0}%", crisis.probability * 100.0);
                let _ = writeln!(out, "  - Severity: {}", crisis.severity);
                if !crisis.interventions.is_empty() {
                    out.push_str("  - Top suggested interventions:\n");
                    for (i, intervention) in crisis.interventions.iter().take(3).enumerate() {
                        let _ = writeln!(
                            out,
                            "    {}. {} (saves {:.0})",
                            i + 1,
                            intervention.action,
                            intervention.impact
                        );
                    }
                }
            }
            None => {
                out.push_str("  - No active crisis detected.\n");
            }
        }
    }

    fn write_savings_section(&self, out: &mut String) {
        let savings = &self.state.savings;
        let progress = savings.fund_balance / FUND_GOAL * 100.0;

        out.push_str("\n- Savings:\n");
        let _ = writeln!(
            out,
            "  - Emergency fund balance: {:.0} / {:.0} ({:.1}%)",
            savings.fund_balance, FUND_GOAL, progress
        );
        let _ = writeln!(out, "  - Reserved for bills: {:.0}", savings.reserved_for_bills);
        let _ = writeln!(out, "  - Mode: {}", savings.mode);
    }

    fn write_advisories_section(&self, out: &mut String) {
        if self.state.advisories.is_empty() {
            return;
        }
        out.push_str("\n- Recent agent advisories:\n");
        for advisory in self.state.advisories.iter().rev().take(5) {
            let _ = writeln!(
                out,
                "  - [{}] {}",
                advisory.severity, advisory.message
            );
        }
    }
}
