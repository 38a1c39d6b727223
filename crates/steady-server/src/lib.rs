//! Steady Web Server
//!
//! Axum-based REST API for the Steady financial-planning application:
//! income upload, scenario forecasts, daily agent checks, decision
//! simulation, and the coaching chat endpoint.
//!
//! All state is request-scoped and in-memory; see `steady_core::UserStore`.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use steady_core::chat::{ChatBackend, ChatClient};
use steady_core::{AgentSystem, UserStore};

mod handlers;
mod scheduler;

pub use scheduler::{start_check_scheduler, CheckScheduleConfig};

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// User id assumed when a request does not name one
pub const DEFAULT_USER_ID: &str = "demo_user";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = allow any origin, the default for the
    /// local single-user deployment)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        let allowed_origins: Vec<String> = std::env::var("STEADY_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self { allowed_origins }
    }
}

/// Shared application state
pub struct AppState {
    pub store: UserStore,
    pub agents: AgentSystem,
    pub chat: Option<ChatClient>,
}

/// Create the application router
pub fn create_router(store: UserStore, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let chat = ChatClient::from_env();
    create_router_with_chat(store, static_dir, config, chat)
}

/// Create the application router with an explicit chat client (for testing)
pub fn create_router_with_chat(
    store: UserStore,
    static_dir: Option<&str>,
    config: ServerConfig,
    chat: Option<ChatClient>,
) -> Router {
    match chat {
        Some(ref client) => {
            info!(
                "Chat backend configured: {} (model: {})",
                client.host(),
                client.model()
            );
        }
        None => {
            info!("Chat backend not configured (set STEADY_CHAT_HOST to enable the chat endpoint)");
        }
    }

    let state = Arc::new(AppState {
        store,
        agents: AgentSystem::new(),
        chat,
    });

    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Income history
        .route("/income/upload", post(handlers::upload_income))
        // Forecast
        .route("/forecast/generate", post(handlers::generate_forecast))
        // Agents
        .route("/agents/daily-check", get(handlers::daily_check))
        .route("/agents/status", get(handlers::agent_status))
        // Decision simulation
        .route("/simulate", post(handlers::simulate_decision))
        // Chat
        .route("/chat", post(handlers::chat));

    // Build CORS layer: any origin by default (single-user local tool with
    // a separately-served frontend), or the configured list
    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    store: UserStore,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    // Check chat backend connection
    check_chat_connection().await;

    // Start background re-check scheduler if configured
    if let Some(schedule) = CheckScheduleConfig::from_env() {
        start_check_scheduler(store.clone(), schedule);
    }

    let app = create_router(store, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log chat backend connection status
async fn check_chat_connection() {
    match ChatClient::from_env() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ Chat backend connected: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  Chat backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("ℹ️  Chat backend not configured (set STEADY_CHAT_HOST to enable chat)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_gateway(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
