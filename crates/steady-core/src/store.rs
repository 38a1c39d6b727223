//! In-memory per-user state store
//!
//! All state is held in process memory for the process lifetime, keyed by
//! user identifier. Each user gets their own lock so concurrent requests
//! for the same user are serialized instead of clobbering each other,
//! while requests for different users proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::UserState;

/// Handle to one user's state
pub type UserHandle = Arc<RwLock<UserState>>;

/// Map of user id -> per-user state, safe to clone and share
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    inner: Arc<RwLock<HashMap<String, UserHandle>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the state handle for a user, creating an empty one on first use
    pub async fn user(&self, user_id: &str) -> UserHandle {
        {
            let users = self.inner.read().await;
            if let Some(handle) = users.get(user_id) {
                return handle.clone();
            }
        }

        let mut users = self.inner.write().await;
        users
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(UserState::new())))
            .clone()
    }

    /// Get the state handle for a user without creating one
    pub async fn get(&self, user_id: &str) -> Option<UserHandle> {
        self.inner.read().await.get(user_id).cloned()
    }

    /// Number of users currently held in memory
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Snapshot of all known user ids
    pub async fn user_ids(&self) -> Vec<String> {
        self.inner.read().await.keys().cloned().collect()
    }
}
