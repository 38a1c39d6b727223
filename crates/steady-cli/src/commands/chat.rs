//! One-shot chat command implementation

use std::path::Path;

use anyhow::{bail, Result};
use chrono::Local;

use steady_core::chat::{ChatBackend, ChatClient};
use steady_core::{AgentSystem, ContextAssembler};

use super::load_state;

pub async fn cmd_chat(
    file: &Path,
    message: &str,
    balance: Option<f64>,
    expenses: f64,
) -> Result<()> {
    let Some(client) = ChatClient::from_env() else {
        bail!("Chat requires a configured backend. Set STEADY_CHAT_HOST and STEADY_CHAT_API_KEY.");
    };

    let mut state = load_state(file, balance, Some(expenses))?;

    // Run the pipeline so the assistant sees fresh derived state
    let agents = AgentSystem::new();
    let today = Local::now().date_naive();
    agents.daily_check(&mut state, today);

    let system_prompt = ContextAssembler::new(&state).assemble();

    println!("🤖 Asking {} ({})...", client.model(), client.host());
    let reply = client.complete(&system_prompt, &[], message).await?;

    println!();
    println!("{}", reply);

    Ok(())
}
