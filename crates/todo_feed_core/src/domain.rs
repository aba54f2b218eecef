//! crates/todo_feed_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any wire or serialization format.

use std::collections::BTreeSet;

/// A single todo, also surfaced to consumers as a social "post".
///
/// The `id` is assigned by the server and is never generated on the client;
/// an item only exists locally once the server has confirmed its creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Ids of the users that have liked this item. "Liked by the current
    /// user" is always a membership test against this set, never a
    /// separately stored boolean.
    pub liked_by: BTreeSet<String>,
}

impl TodoItem {
    /// Whether the given user has liked this item.
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.liked_by.contains(user_id)
    }
}

// Represents the authenticated user - resolved from the profile endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub email: String,
}
