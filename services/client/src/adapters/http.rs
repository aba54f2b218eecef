//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, which is the concrete implementation
//! of the `TodoApi` port from the `core` crate. It handles all interactions
//! with the remote todo/feed API using `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use todo_feed_core::domain::{Profile, TodoItem};
use todo_feed_core::ports::{PortError, PortResult, TodoApi};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An HTTP adapter that implements the `TodoApi` port.
///
/// The adapter owns the timeout policy: every request is bounded by the
/// configured interval and an elapsed timeout surfaces as `PortError::Timeout`.
#[derive(Clone)]
pub struct HttpApiAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApiAdapter {
    /// Creates a new `HttpApiAdapter` for the given base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request expecting a `{data: T}` envelope on success.
    async fn expect_data<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> PortResult<T> {
        let response = request.send().await.map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let envelope: DataEnvelope<T> = response.json().await.map_err(transport_error)?;
        Ok(envelope.data)
    }

    /// Sends a request where only the status matters.
    async fn expect_ok(&self, request: reqwest::RequestBuilder) -> PortResult<()> {
        let response = request.send().await.map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }
}

/// Maps a transport-level failure, distinguishing the adapter's own timeout.
fn transport_error(err: reqwest::Error) -> PortError {
    if err.is_timeout() {
        PortError::Timeout
    } else {
        PortError::Remote(err.to_string())
    }
}

/// Maps a non-2xx response, carrying the server's message when it sent one.
async fn error_from_response(response: reqwest::Response) -> PortError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| format!("server returned {status}"));
    match status {
        StatusCode::UNAUTHORIZED => PortError::Unauthorized,
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        _ => PortError::Remote(message),
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct TokenRecord {
    token: String,
}

#[derive(Deserialize)]
struct TodoRecord {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    description: String,
    #[serde(rename = "likedBy", default)]
    liked_by: Vec<String>,
}
impl TodoRecord {
    fn to_domain(self) -> TodoItem {
        TodoItem {
            id: self.id,
            title: self.title,
            description: self.description,
            liked_by: self.liked_by.into_iter().collect(),
        }
    }
}

#[derive(Deserialize)]
struct ProfileRecord {
    id: String,
    username: String,
    email: String,
}
impl ProfileRecord {
    fn to_domain(self) -> Profile {
        Profile {
            id: self.id,
            username: self.username,
            email: self.email,
        }
    }
}

#[derive(Serialize)]
struct CredentialsPayload<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterPayload<'a> {
    username: &'a str,
    password: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct TodoPayload<'a> {
    title: &'a str,
    description: &'a str,
}

//=========================================================================================
// TodoApi Implementation
//=========================================================================================

#[async_trait]
impl TodoApi for HttpApiAdapter {
    async fn login(&self, username: &str, password: &str) -> PortResult<String> {
        let record: TokenRecord = self
            .expect_data(
                self.client
                    .post(self.url("/api/auth/login"))
                    .json(&CredentialsPayload { username, password }),
            )
            .await?;
        Ok(record.token)
    }

    async fn register(&self, username: &str, password: &str, email: &str) -> PortResult<()> {
        self.expect_ok(
            self.client
                .post(self.url("/api/auth/register"))
                .json(&RegisterPayload {
                    username,
                    password,
                    email,
                }),
        )
        .await
    }

    async fn fetch_profile(&self, token: &str) -> PortResult<Profile> {
        let record: ProfileRecord = self
            .expect_data(self.client.get(self.url("/api/profile")).bearer_auth(token))
            .await?;
        Ok(record.to_domain())
    }

    async fn list_todos(&self, token: &str) -> PortResult<Vec<TodoItem>> {
        let records: Vec<TodoRecord> = self
            .expect_data(self.client.get(self.url("/api/todos")).bearer_auth(token))
            .await?;
        Ok(records.into_iter().map(TodoRecord::to_domain).collect())
    }

    async fn get_todo(&self, token: &str, id: &str) -> PortResult<TodoItem> {
        let record: TodoRecord = self
            .expect_data(
                self.client
                    .get(self.url(&format!("/api/todos/{id}")))
                    .bearer_auth(token),
            )
            .await?;
        Ok(record.to_domain())
    }

    async fn create_todo(
        &self,
        token: &str,
        title: &str,
        description: &str,
    ) -> PortResult<TodoItem> {
        let record: TodoRecord = self
            .expect_data(
                self.client
                    .post(self.url("/api/todos"))
                    .bearer_auth(token)
                    .json(&TodoPayload { title, description }),
            )
            .await?;
        Ok(record.to_domain())
    }

    async fn update_todo(
        &self,
        token: &str,
        id: &str,
        title: &str,
        description: &str,
    ) -> PortResult<TodoItem> {
        let record: TodoRecord = self
            .expect_data(
                self.client
                    .put(self.url(&format!("/api/todos/{id}")))
                    .bearer_auth(token)
                    .json(&TodoPayload { title, description }),
            )
            .await?;
        Ok(record.to_domain())
    }

    async fn delete_todo(&self, token: &str, id: &str) -> PortResult<()> {
        self.expect_ok(
            self.client
                .delete(self.url(&format!("/api/todos/{id}")))
                .bearer_auth(token),
        )
        .await
    }

    async fn like_post(&self, token: &str, id: &str) -> PortResult<()> {
        self.expect_ok(
            self.client
                .post(self.url(&format!("/api/posts/{id}/like")))
                .bearer_auth(token),
        )
        .await
    }

    async fn unlike_post(&self, token: &str, id: &str) -> PortResult<()> {
        self.expect_ok(
            self.client
                .post(self.url(&format!("/api/posts/{id}/unlike")))
                .bearer_auth(token),
        )
        .await
    }
}
