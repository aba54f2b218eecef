//! crates/todo_feed_core/src/sync.rs
//!
//! The collection synchronizer: one in-memory list of items shared by every
//! screen, mutated optimistically by local intents and reconciled against
//! the authenticated HTTP collaborator. Consumers subscribe to an immutable
//! snapshot; they never hold their own copy of the list.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::domain::{Profile, TodoItem};
use crate::ports::{PortError, TodoApi};
use crate::session::SessionStore;

//=========================================================================================
// Intent Error and Result Types
//=========================================================================================

/// The error taxonomy for synchronizer intents.
///
/// Intents never panic and never throw past this boundary: every failure is
/// returned to the caller *and* recorded in the snapshot's `last_error`, so
/// all subscribed screens see it, not just the one that issued the intent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// Bad local input; no network call was attempted.
    #[error("Validation failed: {0}")]
    Validation(String),
    /// No token is present for an operation that requires one.
    #[error("Not authenticated")]
    Unauthenticated,
    /// The referenced id is absent from local state; no network call was attempted.
    #[error("No item with id {0}")]
    NotFound(String),
    /// A non-2xx response or transport failure from the HTTP collaborator.
    #[error("Remote call failed: {0}")]
    Remote(String),
    /// The collaborator's timeout elapsed. Handled exactly like `Remote`.
    #[error("Remote call timed out")]
    Timeout,
}

impl From<PortError> for SyncError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Timeout => SyncError::Timeout,
            other => SyncError::Remote(other.to_string()),
        }
    }
}

/// A convenience type alias for `Result<T, SyncError>`.
pub type SyncResult<T> = Result<T, SyncError>;

//=========================================================================================
// The Published Snapshot
//=========================================================================================

/// The externally visible, point-in-time view of the collection.
///
/// Items are in server order; the client never re-sorts them. The snapshot
/// is replaced atomically on every mutation, so a reader can never observe
/// a partially updated item.
#[derive(Debug, Clone, Default)]
pub struct CollectionSnapshot {
    pub items: Vec<TodoItem>,
    pub is_loading: bool,
    pub last_error: Option<SyncError>,
}

impl CollectionSnapshot {
    /// Looks up an item by id.
    pub fn item(&self, id: &str) -> Option<&TodoItem> {
        self.items.iter().find(|i| i.id == id)
    }
}

//=========================================================================================
// The Collection Synchronizer
//=========================================================================================

/// Owns the canonical in-memory collection and reconciles it with the server.
///
/// Mutations on the *same* item are serialized through a per-item in-flight
/// slot: a second intent for an item queues until the first resolves, so a
/// rapid double toggle can never race two like calls past each other.
/// Operations on different items, and `refresh`, proceed concurrently.
///
/// Reconciliation and rollback always target the item by id against
/// whatever snapshot is current when the remote call resolves, never by
/// positional index, because a refresh that completed mid-flight may have
/// reordered or removed items. An id lookup miss discards the
/// reconciliation silently; it is not a fault.
pub struct CollectionSynchronizer {
    session: SessionStore,
    api: Arc<dyn TodoApi>,
    tx: watch::Sender<CollectionSnapshot>,
    /// One in-flight mutation slot per item id.
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// The authenticated user's profile, keyed by the token that fetched it
    /// so a rotated token invalidates the cache.
    profile_cache: Mutex<Option<(String, Profile)>>,
}

impl CollectionSynchronizer {
    /// Creates a new synchronizer with an empty collection.
    pub fn new(session: SessionStore, api: Arc<dyn TodoApi>) -> Self {
        let (tx, _rx) = watch::channel(CollectionSnapshot::default());
        Self {
            session,
            api,
            tx,
            slots: Mutex::new(HashMap::new()),
            profile_cache: Mutex::new(None),
        }
    }

    /// Subscribes to snapshot updates. Any number of consumers may hold a
    /// receiver; they all observe the same sequence of snapshots.
    pub fn subscribe(&self) -> watch::Receiver<CollectionSnapshot> {
        self.tx.subscribe()
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> CollectionSnapshot {
        self.tx.borrow().clone()
    }

    //=====================================================================================
    // Intents
    //=====================================================================================

    /// Replaces the entire local collection with the server's current state.
    ///
    /// This is a full replace, not a merge: the baseline reconciliation
    /// every other intent falls back to. On failure the previous items are
    /// left untouched and only the error is recorded.
    pub async fn refresh(&self) -> SyncResult<()> {
        let token = match self.require_token().await {
            Ok(token) => token,
            Err(e) => return Err(self.record_error(e)),
        };

        self.tx.send_modify(|s| s.is_loading = true);

        match self.api.list_todos(&token).await {
            Ok(items) => {
                debug!("Refresh fetched {} items", items.len());
                self.tx.send_modify(|s| {
                    s.items = items;
                    s.is_loading = false;
                    s.last_error = None;
                });
                Ok(())
            }
            Err(e) => {
                let err = SyncError::from(e);
                self.tx.send_modify(|s| {
                    s.is_loading = false;
                    s.last_error = Some(err.clone());
                });
                Err(err)
            }
        }
    }

    /// Creates a new item. There is no optimistic insert: the id is
    /// server-assigned, so the item appears locally only once the server
    /// confirms it.
    pub async fn create(&self, title: &str, description: &str) -> SyncResult<()> {
        if title.is_empty() || description.is_empty() {
            return Err(self.record_error(SyncError::Validation(
                "both title and description are required".to_string(),
            )));
        }

        let token = match self.require_token().await {
            Ok(token) => token,
            Err(e) => return Err(self.record_error(e)),
        };

        match self.api.create_todo(&token, title, description).await {
            Ok(item) => {
                self.tx.send_modify(|s| {
                    s.items.push(item);
                    s.last_error = None;
                });
                Ok(())
            }
            Err(e) => Err(self.record_error(e.into())),
        }
    }

    /// Updates an item's text fields. Write-through: no optimistic
    /// pre-mutation, the local copy changes only when the server returns its
    /// representation (including any server-side normalization).
    pub async fn update(&self, id: &str, title: &str, description: &str) -> SyncResult<()> {
        let slot = self.item_slot(id).await;
        let result = {
            let _in_flight = slot.lock().await;
            self.update_locked(id, title, description).await
        };
        drop(slot);
        self.reap_slot(id).await;
        result
    }

    async fn update_locked(&self, id: &str, title: &str, description: &str) -> SyncResult<()> {
        if self.tx.borrow().item(id).is_none() {
            return Err(self.record_error(SyncError::NotFound(id.to_string())));
        }
        let token = match self.require_token().await {
            Ok(token) => token,
            Err(e) => return Err(self.record_error(e)),
        };

        match self.api.update_todo(&token, id, title, description).await {
            Ok(updated) => {
                self.tx.send_modify(|s| {
                    match s.items.iter_mut().find(|i| i.id == updated.id) {
                        Some(existing) => *existing = updated,
                        // A concurrent refresh dropped the item; nothing to reconcile.
                        None => debug!("Update reconciliation skipped, id {id} no longer present"),
                    }
                    s.last_error = None;
                });
                Ok(())
            }
            Err(e) => Err(self.record_error(e.into())),
        }
    }

    /// Deletes an item. The removal is applied optimistically so the UI
    /// reflects it without waiting on the network; a failed remote call
    /// re-inserts the exact item at its original position.
    pub async fn delete(&self, id: &str) -> SyncResult<()> {
        let slot = self.item_slot(id).await;
        let result = {
            let _in_flight = slot.lock().await;
            self.delete_locked(id).await
        };
        drop(slot);
        self.reap_slot(id).await;
        result
    }

    async fn delete_locked(&self, id: &str) -> SyncResult<()> {
        let token = match self.require_token().await {
            Ok(token) => token,
            Err(e) => return Err(self.record_error(e)),
        };

        // Optimistic removal, remembering the original position for rollback.
        let mut removed: Option<(usize, TodoItem)> = None;
        self.tx.send_modify(|s| {
            if let Some(pos) = s.items.iter().position(|i| i.id == id) {
                removed = Some((pos, s.items.remove(pos)));
            }
        });
        let Some((pos, item)) = removed else {
            return Err(self.record_error(SyncError::NotFound(id.to_string())));
        };

        match self.api.delete_todo(&token, id).await {
            Ok(()) => {
                self.tx.send_modify(|s| {
                    // A refresh that resolved mid-flight may have re-surfaced
                    // the item; reconciliation removes it again by id.
                    s.items.retain(|i| i.id != id);
                    s.last_error = None;
                });
                Ok(())
            }
            Err(e) => {
                let err = SyncError::from(e);
                self.tx.send_modify(|s| {
                    if s.items.iter().all(|i| i.id != item.id) {
                        let at = pos.min(s.items.len());
                        s.items.insert(at, item);
                    }
                    s.last_error = Some(err.clone());
                });
                Err(err)
            }
        }
    }

    /// Toggles the current user's like on an item.
    ///
    /// The direction of the remote call is decided from the pre-toggle
    /// membership, under the item's in-flight slot, so the second of two
    /// rapid toggles waits for the first to resolve and then issues the
    /// opposite call, never a duplicate.
    pub async fn toggle_like(&self, id: &str) -> SyncResult<()> {
        let slot = self.item_slot(id).await;
        let result = {
            let _in_flight = slot.lock().await;
            self.toggle_like_locked(id).await
        };
        drop(slot);
        self.reap_slot(id).await;
        result
    }

    async fn toggle_like_locked(&self, id: &str) -> SyncResult<()> {
        let token = match self.require_token().await {
            Ok(token) => token,
            Err(e) => return Err(self.record_error(e)),
        };
        let user_id = match self.current_user_id(&token).await {
            Ok(user_id) => user_id,
            Err(e) => return Err(self.record_error(e)),
        };

        // Decide the direction and apply the optimistic toggle in one
        // atomic snapshot replacement.
        let mut was_liked: Option<bool> = None;
        self.tx.send_modify(|s| {
            if let Some(item) = s.items.iter_mut().find(|i| i.id == id) {
                let liked = item.liked_by.contains(&user_id);
                if liked {
                    item.liked_by.remove(&user_id);
                } else {
                    item.liked_by.insert(user_id.clone());
                }
                was_liked = Some(liked);
            }
        });
        let Some(was_liked) = was_liked else {
            return Err(self.record_error(SyncError::NotFound(id.to_string())));
        };

        // The remote call matches the pre-toggle state.
        let result = if was_liked {
            self.api.unlike_post(&token, id).await
        } else {
            self.api.like_post(&token, id).await
        };

        match result {
            Ok(()) => {
                // The optimistic toggle already matches the server.
                self.tx.send_modify(|s| s.last_error = None);
                Ok(())
            }
            Err(e) => {
                let err = SyncError::from(e);
                self.tx.send_modify(|s| {
                    if let Some(item) = s.items.iter_mut().find(|i| i.id == id) {
                        if was_liked {
                            item.liked_by.insert(user_id.clone());
                        } else {
                            item.liked_by.remove(&user_id);
                        }
                    }
                    s.last_error = Some(err.clone());
                });
                Err(err)
            }
        }
    }

    /// Fetches a single item by id and returns the server's representation,
    /// replacing the local copy when one is present. Read-through only: no
    /// optimistic step, no in-flight slot.
    pub async fn fetch_item(&self, id: &str) -> SyncResult<TodoItem> {
        let token = match self.require_token().await {
            Ok(token) => token,
            Err(e) => return Err(self.record_error(e)),
        };

        match self.api.get_todo(&token, id).await {
            Ok(item) => {
                let fetched = item.clone();
                self.tx.send_modify(|s| {
                    if let Some(existing) = s.items.iter_mut().find(|i| i.id == item.id) {
                        *existing = item;
                    }
                    s.last_error = None;
                });
                Ok(fetched)
            }
            Err(e) => Err(self.record_error(e.into())),
        }
    }

    //=====================================================================================
    // Internals
    //=====================================================================================

    /// Reads the token at call time; a concurrent login/logout flow can
    /// rotate it between intents.
    async fn require_token(&self) -> SyncResult<String> {
        self.session.get().await.ok_or(SyncError::Unauthenticated)
    }

    /// Records the failure in the snapshot for every subscriber, then hands
    /// it back for the caller's result.
    fn record_error(&self, err: SyncError) -> SyncError {
        self.tx.send_modify(|s| s.last_error = Some(err.clone()));
        err
    }

    /// Resolves the current user's id, fetching the profile once per token.
    async fn current_user_id(&self, token: &str) -> SyncResult<String> {
        let mut cache = self.profile_cache.lock().await;
        if let Some((cached_token, profile)) = cache.as_ref() {
            if cached_token == token {
                return Ok(profile.id.clone());
            }
        }
        let profile = self.api.fetch_profile(token).await?;
        let user_id = profile.id.clone();
        *cache = Some((token.to_string(), profile));
        Ok(user_id)
    }

    /// Returns the in-flight slot for an item, creating it on first use.
    async fn item_slot(&self, id: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().await;
        slots
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops a slot nobody is queued on, so deleted items don't accumulate.
    async fn reap_slot(&self, id: &str) {
        let mut slots = self.slots.lock().await;
        if let Some(slot) = slots.get(id) {
            if Arc::strong_count(slot) == 1 {
                slots.remove(id);
            }
        }
    }
}
