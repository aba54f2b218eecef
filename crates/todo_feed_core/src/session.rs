//! crates/todo_feed_core/src/session.rs
//!
//! Holds the current authentication credential on top of the persistent
//! `CredentialStore` collaborator.

use std::sync::Arc;
use tracing::warn;

use crate::ports::CredentialStore;

/// The fixed key the bearer token is stored under.
const TOKEN_KEY: &str = "token";

/// The session store: get/set/clear for the bearer token.
///
/// Reads are a snapshot at call time. A concurrent login or logout can
/// rotate or clear the token between two reads, which is why every
/// authenticated operation re-reads the token instead of caching it at
/// construction time.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn CredentialStore>,
}

impl SessionStore {
    /// Creates a new `SessionStore` over the given persistent collaborator.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Returns the current token, or `None` when unauthenticated.
    ///
    /// An unavailable underlying store reads as "absent"; intent callers
    /// never see a storage error from here.
    pub async fn get(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY).await {
            Ok(token) => token,
            Err(e) => {
                warn!("Credential store read failed, treating as absent: {e}");
                None
            }
        }
    }

    /// Stores the token, overwriting any prior value. Last write wins.
    pub async fn set(&self, token: &str) {
        if let Err(e) = self.store.set(TOKEN_KEY, token).await {
            warn!("Failed to persist token: {e}");
        }
    }

    /// Removes the token; subsequent `get()` returns `None`.
    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(TOKEN_KEY).await {
            warn!("Failed to clear token: {e}");
        }
    }
}
