//! Steady Core Library
//!
//! Shared functionality for the Steady financial-planning tool:
//! - Income history import from CSV
//! - Income pattern classification and scenario forecasting
//! - Crisis detection via balance-depletion simulation
//! - Savings management (daily save suggestions, bill reserves)
//! - Agent pipeline orchestration (forecast -> crisis -> savings)
//! - Pluggable chat backends for the coaching assistant
//! - Prompt-context assembler for LLM chat
//! - In-memory per-user state store

pub mod agents;
pub mod chat;
pub mod context;
pub mod error;
pub mod import;
pub mod models;
pub mod store;

pub use agents::{AgentSystem, CrisisDetector, IncomeForecaster, SavingsManager};
pub use chat::{ChatBackend, ChatClient, ChatMessage, MockBackend, OpenAICompatibleBackend};
pub use context::ContextAssembler;
pub use error::{Error, Result};
pub use models::{
    Advisory, AdvisoryKind, AgentName, Bill, BillReserves, CrisisReport, CrisisSnapshot,
    DailyCheck, Decision, DecisionImpact, DecisionKind, IncomePattern, IncomeRecord, Intervention,
    InterventionKind, MarginOfSafety, Projection, SaveSuggestion, SavingsAction, SavingsMode,
    SavingsState, ScenarioSet, Severity, Suggestion, UserState,
};
pub use store::UserStore;
