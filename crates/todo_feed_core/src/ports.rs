//! crates/todo_feed_core/src/ports.rs
//!
//! Defines the collaborator contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like HTTP transports
//! or on-device key-value storage.

use async_trait::async_trait;

use crate::domain::{Profile, TodoItem};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, disk).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Remote call failed: {0}")]
    Remote(String),
    #[error("Remote call timed out")]
    Timeout,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Collaborator Ports (Traits)
//=========================================================================================

/// Persistent key-value storage for the auth credential.
///
/// Implementations own durability; the core only ever uses a single fixed
/// key (see `SessionStore`) and treats every read as a snapshot at call time.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;

    async fn remove(&self, key: &str) -> PortResult<()>;
}

/// The authenticated HTTP collaborator, one method per remote intent.
///
/// All methods except `login` and `register` require the caller to supply
/// the bearer token. Implementations own the timeout policy and report an
/// expired interval as `PortError::Timeout`.
#[async_trait]
pub trait TodoApi: Send + Sync {
    // --- Auth ---
    /// Exchanges credentials for a bearer token.
    async fn login(&self, username: &str, password: &str) -> PortResult<String>;

    /// Creates a new account. No token is issued; callers log in afterwards.
    async fn register(&self, username: &str, password: &str, email: &str) -> PortResult<()>;

    /// Fetches the authenticated user's profile.
    async fn fetch_profile(&self, token: &str) -> PortResult<Profile>;

    // --- Todos ---
    /// Fetches the full collection, in server order.
    async fn list_todos(&self, token: &str) -> PortResult<Vec<TodoItem>>;

    async fn get_todo(&self, token: &str, id: &str) -> PortResult<TodoItem>;

    async fn create_todo(
        &self,
        token: &str,
        title: &str,
        description: &str,
    ) -> PortResult<TodoItem>;

    async fn update_todo(
        &self,
        token: &str,
        id: &str,
        title: &str,
        description: &str,
    ) -> PortResult<TodoItem>;

    async fn delete_todo(&self, token: &str, id: &str) -> PortResult<()>;

    // --- Posts (social surface of the same items) ---
    async fn like_post(&self, token: &str, id: &str) -> PortResult<()>;

    async fn unlike_post(&self, token: &str, id: &str) -> PortResult<()>;
}
