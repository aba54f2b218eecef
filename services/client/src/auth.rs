//! services/client/src/auth.rs
//!
//! The authentication flow: login, registration, and logout against the
//! remote API, with the resulting token handed to the session store.

use std::sync::Arc;

use todo_feed_core::ports::TodoApi;
use todo_feed_core::session::SessionStore;
use todo_feed_core::sync::{SyncError, SyncResult};
use tracing::info;

/// Drives login/register/logout. Screens submit credentials here; the
/// synchronizer only ever reads the token back out of the session store.
#[derive(Clone)]
pub struct AuthFlow {
    api: Arc<dyn TodoApi>,
    session: SessionStore,
}

impl AuthFlow {
    pub fn new(api: Arc<dyn TodoApi>, session: SessionStore) -> Self {
        Self { api, session }
    }

    /// Exchanges credentials for a token and persists it.
    pub async fn login(&self, username: &str, password: &str) -> SyncResult<()> {
        if username.is_empty() || password.is_empty() {
            return Err(SyncError::Validation(
                "username and password are required".to_string(),
            ));
        }
        let token = self.api.login(username, password).await?;
        self.session.set(&token).await;
        info!("Logged in as {username}");
        Ok(())
    }

    /// Creates a new account. No token is issued; call `login` afterwards.
    pub async fn register(&self, username: &str, password: &str, email: &str) -> SyncResult<()> {
        if username.is_empty() || password.is_empty() || email.is_empty() {
            return Err(SyncError::Validation(
                "username, password and email are required".to_string(),
            ));
        }
        self.api.register(username, password, email).await?;
        info!("Registered account {username}");
        Ok(())
    }

    /// Clears the stored token. Subsequent authenticated intents fail with
    /// `SyncError::Unauthenticated` until the next login.
    pub async fn logout(&self) {
        self.session.clear().await;
        info!("Logged out");
    }
}
