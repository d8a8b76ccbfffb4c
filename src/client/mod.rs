//! Typed HTTP client for the REST API, the counterpart of the browser frontend.
//!
//! The client validates payloads with the same rules as the server before sending
//! them, attaches the stored access token to task requests, and when a request comes
//! back 401 it refreshes the access token once and replays the request once. If the
//! refresh itself fails the stored session is cleared and `SessionEvent::Expired` is
//! broadcast to every subscriber.

pub mod store;

use std::sync::Arc;

use actix_web::ResponseError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::auth::{
    LoginRequest, LoginResponse, MessageResponse, RefreshRequest, RefreshResponse, RegisterRequest,
};
use crate::error::AppError;
use crate::models::{Task, TaskDraft, TaskInput};

pub use store::{MemoryTokenStore, TokenStore};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected by a field rule, either locally or by the server.
    #[error("validation failed: {}", .0.join(" "))]
    Validation(Vec<String>),
    /// The server answered with an error status.
    #[error("request failed with status {status}: {message}")]
    Api { status: u16, message: String },
    /// No usable refresh token; the user has to log in again.
    #[error("session expired, please login again")]
    SessionExpired,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<AppError> for ClientError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::ValidationError(messages) => ClientError::Validation(messages),
            other => ClientError::Api {
                status: other.status_code().as_u16(),
                message: other.to_string(),
            },
        }
    }
}

/// Notifications about the stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Tokens were cleared because they could not be refreshed.
    Expired,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:3000/api`.
    pub fn new(base_url: impl Into<String>, store: Arc<dyn TokenStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            events,
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Username saved by the last successful login.
    pub fn username(&self) -> Option<String> {
        self.store.username()
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.access_token().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<MessageResponse, ClientError> {
        request.clone().into_registration()?;
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(&request)
            .send()
            .await?;
        parse(response).await
    }

    /// Logs in and saves both tokens plus the username.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ClientError> {
        request.clone().into_credentials()?;
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&request)
            .send()
            .await?;
        let login: LoginResponse = parse(response).await?;
        self.store
            .save_login(&login.access_token, &login.refresh_token, &login.username);
        Ok(login)
    }

    /// Exchanges the stored refresh token for a new access token and saves it.
    pub async fn refresh(&self) -> Result<String, ClientError> {
        let token = self.store.refresh_token().ok_or(ClientError::SessionExpired)?;
        let response = self
            .http
            .post(self.url("/auth/refresh-token"))
            .json(&RefreshRequest { token: Some(token) })
            .send()
            .await?;
        let refreshed: RefreshResponse = parse(response).await?;
        self.store.set_access_token(&refreshed.access_token);
        Ok(refreshed.access_token)
    }

    /// Forgets the session locally; tokens stay valid on the server until they expire.
    pub fn logout(&self) {
        self.store.clear();
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let url = self.url("/tasks");
        let response = self.send_authorized(|http| http.get(&url)).await?;
        parse(response).await
    }

    pub async fn get_task(&self, id: i32) -> Result<Task, ClientError> {
        let url = self.url(&format!("/tasks/{}", id));
        let response = self.send_authorized(|http| http.get(&url)).await?;
        parse(response).await
    }

    /// Missing priority and status are sent as `media` and `pendiente`.
    pub async fn create_task(&self, input: TaskInput) -> Result<Task, ClientError> {
        let mut draft = input.into_draft()?;
        draft.priority.get_or_insert_with(Default::default);
        draft.status.get_or_insert_with(Default::default);

        let url = self.url("/tasks");
        let response = self
            .send_authorized(|http| http.post(&url).json(&draft))
            .await?;
        parse(response).await
    }

    pub async fn update_task(&self, id: i32, input: TaskInput) -> Result<Task, ClientError> {
        let draft: TaskDraft = input.into_draft()?;
        let url = self.url(&format!("/tasks/{}", id));
        let response = self
            .send_authorized(|http| http.put(&url).json(&draft))
            .await?;
        parse(response).await
    }

    /// Returns the server's confirmation message.
    pub async fn delete_task(&self, id: i32) -> Result<String, ClientError> {
        let url = self.url(&format!("/tasks/{}", id));
        let response = self.send_authorized(|http| http.delete(&url)).await?;
        let body: MessageResponse = parse(response).await?;
        Ok(body.message)
    }

    /// Sends with the bearer token; on 401 refreshes once and replays once.
    async fn send_authorized<F>(&self, build: F) -> Result<Response, ClientError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut retried = false;
        loop {
            let mut request = build(&self.http);
            if let Some(token) = self.store.access_token() {
                request = request.bearer_auth(token);
            }
            let response = request.send().await?;
            if response.status() != StatusCode::UNAUTHORIZED || retried {
                return Ok(response);
            }
            retried = true;

            if let Err(e) = self.refresh().await {
                log::warn!("Token refresh failed, ending session: {}", e);
                self.expire_session();
                return Err(ClientError::SessionExpired);
            }
        }
    }

    fn expire_session(&self) {
        self.store.clear();
        // No subscribers is fine.
        let _ = self.events.send(SessionEvent::Expired);
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await?;
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    if !body.errors.is_empty() {
        return Err(ClientError::Validation(body.errors));
    }
    Err(ClientError::Api {
        status: status.as_u16(),
        message: body.error.unwrap_or(text),
    })
}
