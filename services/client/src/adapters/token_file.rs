//! services/client/src/adapters/token_file.rs
//!
//! This module contains the on-device credential store adapter, which is the
//! concrete implementation of the `CredentialStore` port from the `core`
//! crate. Credentials live in a small JSON string-to-string map on disk.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use todo_feed_core::ports::{CredentialStore, PortError, PortResult};

/// A credential store backed by a JSON file.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a new `FileCredentialStore` at the given path. The file is
    /// created lazily on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_map(&self) -> PortResult<HashMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| PortError::Unexpected(format!("corrupt credential file: {e}"))),
            // A store that was never written to reads as empty.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(PortError::Unexpected(format!(
                "failed to read credential file: {e}"
            ))),
        }
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    PortError::Unexpected(format!("failed to create credential dir: {e}"))
                })?;
            }
        }
        let json = serde_json::to_string_pretty(map)
            .map_err(|e| PortError::Unexpected(format!("failed to encode credentials: {e}")))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| PortError::Unexpected(format!("failed to write credential file: {e}")))
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.read_map().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}
