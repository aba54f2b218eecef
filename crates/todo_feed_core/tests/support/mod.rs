//! Shared test doubles for the core crate's integration tests.
//!
//! `FakeApi` keeps a server-side list of items and serves/mutates it like the
//! real backend would, with scripted failures and semaphore gates so a test
//! can hold a remote call in flight and observe the optimistic state.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use todo_feed_core::domain::{Profile, TodoItem};
use todo_feed_core::ports::{CredentialStore, PortError, PortResult, TodoApi};
use todo_feed_core::session::SessionStore;
use todo_feed_core::sync::CollectionSynchronizer;

/// Builds a `TodoItem` literal.
pub fn item(id: &str, title: &str, description: &str, liked_by: &[&str]) -> TodoItem {
    TodoItem {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        liked_by: liked_by.iter().map(|s| s.to_string()).collect(),
    }
}

#[derive(Clone, Copy)]
pub enum FailureKind {
    Remote,
    Timeout,
}

pub struct FakeApi {
    /// Server-side truth the fake serves and mutates.
    pub server_items: Mutex<Vec<TodoItem>>,
    pub user: Profile,
    calls: Mutex<Vec<String>>,
    tokens: Mutex<Vec<String>>,
    next_id: AtomicUsize,
    fail: Mutex<HashMap<&'static str, FailureKind>>,
    gates: Mutex<HashMap<&'static str, Arc<Semaphore>>>,
}

impl FakeApi {
    pub fn new(items: Vec<TodoItem>) -> Arc<Self> {
        Arc::new(Self {
            server_items: Mutex::new(items),
            user: Profile {
                id: "u1".to_string(),
                username: "user1".to_string(),
                email: "user1@example.com".to_string(),
            },
            calls: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            fail: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        })
    }

    /// Makes `method` fail until `succeed_on` is called for it.
    pub fn fail_on(&self, method: &'static str, kind: FailureKind) {
        self.fail.lock().unwrap().insert(method, kind);
    }

    pub fn succeed_on(&self, method: &'static str) {
        self.fail.lock().unwrap().remove(method);
    }

    /// Makes `method` block in flight until a permit is added to the
    /// returned semaphore. The call is recorded before it blocks.
    pub fn gate(&self, method: &'static str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(method, gate.clone());
        gate
    }

    /// Every call in arrival order, e.g. `["list", "like 1"]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// The bearer token supplied to each authenticated call, in order.
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn server_snapshot(&self) -> Vec<TodoItem> {
        self.server_items.lock().unwrap().clone()
    }

    fn note_token(&self, token: &str) {
        self.tokens.lock().unwrap().push(token.to_string());
    }

    async fn enter(&self, method: &'static str, detail: &str) -> PortResult<()> {
        let call = if detail.is_empty() {
            method.to_string()
        } else {
            format!("{method} {detail}")
        };
        self.calls.lock().unwrap().push(call);

        let gate = self.gates.lock().unwrap().get(method).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        match self.fail.lock().unwrap().get(method) {
            Some(FailureKind::Remote) => Err(PortError::Remote("injected failure".to_string())),
            Some(FailureKind::Timeout) => Err(PortError::Timeout),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TodoApi for FakeApi {
    async fn login(&self, username: &str, _password: &str) -> PortResult<String> {
        self.enter("login", username).await?;
        Ok(format!("token-{username}"))
    }

    async fn register(&self, username: &str, _password: &str, _email: &str) -> PortResult<()> {
        self.enter("register", username).await
    }

    async fn fetch_profile(&self, token: &str) -> PortResult<Profile> {
        self.note_token(token);
        self.enter("profile", "").await?;
        Ok(self.user.clone())
    }

    async fn list_todos(&self, token: &str) -> PortResult<Vec<TodoItem>> {
        self.note_token(token);
        self.enter("list", "").await?;
        Ok(self.server_snapshot())
    }

    async fn get_todo(&self, token: &str, id: &str) -> PortResult<TodoItem> {
        self.note_token(token);
        self.enter("get", id).await?;
        self.server_items
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(id.to_string()))
    }

    async fn create_todo(
        &self,
        token: &str,
        title: &str,
        description: &str,
    ) -> PortResult<TodoItem> {
        self.note_token(token);
        self.enter("create", title).await?;
        let id = format!("srv-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        // The backend normalizes whitespace; reconciliation must carry
        // the server's representation, not the client's input.
        let item = TodoItem {
            id,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            liked_by: Default::default(),
        };
        self.server_items.lock().unwrap().push(item.clone());
        Ok(item)
    }

    async fn update_todo(
        &self,
        token: &str,
        id: &str,
        title: &str,
        description: &str,
    ) -> PortResult<TodoItem> {
        self.note_token(token);
        self.enter("update", id).await?;
        let mut items = self.server_items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| PortError::NotFound(id.to_string()))?;
        item.title = title.trim().to_string();
        item.description = description.trim().to_string();
        Ok(item.clone())
    }

    async fn delete_todo(&self, token: &str, id: &str) -> PortResult<()> {
        self.note_token(token);
        self.enter("delete", id).await?;
        self.server_items.lock().unwrap().retain(|i| i.id != id);
        Ok(())
    }

    async fn like_post(&self, token: &str, id: &str) -> PortResult<()> {
        self.note_token(token);
        self.enter("like", id).await?;
        if let Some(item) = self.server_items.lock().unwrap().iter_mut().find(|i| i.id == id) {
            item.liked_by.insert(self.user.id.clone());
        }
        Ok(())
    }

    async fn unlike_post(&self, token: &str, id: &str) -> PortResult<()> {
        self.note_token(token);
        self.enter("unlike", id).await?;
        if let Some(item) = self.server_items.lock().unwrap().iter_mut().find(|i| i.id == id) {
            item.liked_by.remove(&self.user.id);
        }
        Ok(())
    }
}

/// An in-memory credential store with an availability switch.
#[derive(Default)]
pub struct MemoryCredentialStore {
    map: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryCredentialStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check_available(&self) -> PortResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(PortError::Unexpected("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        self.check_available()?;
        Ok(self.map.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.check_available()?;
        self.map
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.check_available()?;
        self.map.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Everything a synchronizer test needs, already logged in as `u1`.
pub struct Harness {
    pub api: Arc<FakeApi>,
    pub store: Arc<MemoryCredentialStore>,
    pub session: SessionStore,
    pub sync: Arc<CollectionSynchronizer>,
}

pub async fn harness_with(items: Vec<TodoItem>) -> Harness {
    let api = FakeApi::new(items);
    let store = MemoryCredentialStore::new();
    let session = SessionStore::new(store.clone());
    session.set("tok-1").await;
    let sync = Arc::new(CollectionSynchronizer::new(session.clone(), api.clone()));
    Harness {
        api,
        store,
        session,
        sync,
    }
}

/// Yields until the fake's call log satisfies `pred`.
pub async fn wait_for_calls(api: &FakeApi, pred: impl Fn(&[String]) -> bool) {
    for _ in 0..10_000 {
        if pred(&api.calls()) {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("call log never satisfied the condition: {:?}", api.calls());
}
