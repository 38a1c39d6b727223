//! Server command implementation

use std::path::Path;

use anyhow::Result;

use steady_core::UserStore;
use steady_server::{CheckScheduleConfig, ServerConfig};

pub async fn cmd_serve(host: &str, port: u16, static_dir: Option<&Path>) -> Result<()> {
    println!("🚀 Starting Steady web server...");
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let config = ServerConfig::from_env();
    if config.allowed_origins.is_empty() {
        println!("   CORS: any origin (set STEADY_ALLOWED_ORIGINS to restrict)");
    } else {
        println!("   CORS: {}", config.allowed_origins.join(", "));
    }

    if std::env::var("STEADY_CHAT_HOST").is_ok() {
        println!("   💬 Chat backend: configured (STEADY_CHAT_HOST)");
    } else {
        println!("   💬 Chat backend: not configured (chat endpoint disabled)");
    }

    if let Some(schedule) = CheckScheduleConfig::from_env() {
        println!(
            "   ⏱️  Re-check schedule: every {} hours (STEADY_CHECK_SCHEDULE)",
            schedule.interval_hours
        );
    }

    let static_dir_str = static_dir.map(|p| p.to_string_lossy().to_string());

    steady_server::serve(
        UserStore::new(),
        host,
        port,
        static_dir_str.as_deref(),
        config,
    )
    .await
}
