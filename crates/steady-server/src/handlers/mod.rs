//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod agents;
pub mod chat;
pub mod forecast;
pub mod health;
pub mod income;

// Re-export all handlers for use in router
pub use agents::*;
pub use chat::*;
pub use forecast::*;
pub use health::*;
pub use income::*;
