//! reqwest-backed gateway speaking the server's JSON contract.

use reqwest::header::COOKIE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::TaskGateway;
use crate::error::GatewayError;
use crate::settings::{LocaleSettings, LocaleSettingsPatch};
use crate::storage::Config;
use crate::task::{NewTask, Task, TaskCount, TaskFilter, TaskId, TaskPatch, TaskQuery};

/// Name of the cookie the server reads the session from.
pub const SESSION_COOKIE: &str = "session_token";

/// HTTP client for the task server.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
    session_token: Option<String>,
}

impl HttpGateway {
    /// Create a gateway rooted at `base_url`.
    ///
    /// A path prefix on the base URL is kept: `https://host/daytick` serves
    /// the API under `https://host/daytick/api/`.
    pub fn new(base_url: &str, session_token: Option<String>) -> Result<Self, GatewayError> {
        let mut base = Url::parse(base_url.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
            session_token,
        })
    }

    /// Build from the effective client configuration.
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        Self::new(&config.server.base_url, config.server.session_token.clone())
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, GatewayError> {
        Ok(self.base.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, GatewayError> {
        let url = self.url(path)?;
        debug!(%method, %url, "gateway request");
        let mut builder = self.client.request(method, url);
        if let Some(ref token) = self.session_token {
            builder = builder.header(COOKIE, format!("{SESSION_COOKIE}={token}"));
        }
        Ok(builder)
    }

    async fn send(builder: RequestBuilder, fallback: &str) -> Result<Response, GatewayError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Status {
            status: status.as_u16(),
            message: error_message(&body, fallback),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        builder: RequestBuilder,
        fallback: &str,
    ) -> Result<T, GatewayError> {
        let response = Self::send(builder, fallback).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Reduce an error body to the message shown to the user.
///
/// The server wraps messages as `{"error": "..."}`; anything else non-empty
/// is used verbatim.
pub fn error_message(body: &str, fallback: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let body = body.trim();
    if body.is_empty() {
        return fallback.to_string();
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.trim().is_empty() => parsed.error,
        Ok(_) => fallback.to_string(),
        Err(_) => body.to_string(),
    }
}

impl TaskGateway for HttpGateway {
    async fn fetch_settings(&self) -> Result<LocaleSettings, GatewayError> {
        let builder = self.request(Method::GET, "api/me")?;
        Self::send_json(builder, "could not get current locale settings").await
    }

    async fn update_settings(
        &self,
        patch: &LocaleSettingsPatch,
    ) -> Result<LocaleSettings, GatewayError> {
        let builder = self.request(Method::PATCH, "api/me")?.json(patch);
        Self::send_json(builder, "could not update locale settings").await
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, GatewayError> {
        let builder = self
            .request(Method::GET, "api/tasks")?
            .query(&query.query_pairs());
        Self::send_json(builder, "could not get tasks").await
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> Result<u64, GatewayError> {
        let builder = self
            .request(Method::GET, "api/tasks/count")?
            .query(&filter.query_pairs());
        let count: TaskCount = Self::send_json(builder, "could not count tasks").await?;
        Ok(count.count)
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, GatewayError> {
        let builder = self.request(Method::GET, &format!("api/tasks/{id}"))?;
        Self::send_json(builder, "could not get task").await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, GatewayError> {
        let builder = self.request(Method::POST, "api/tasks")?.json(task);
        Self::send_json(builder, "could not create task").await
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, GatewayError> {
        let builder = self
            .request(Method::PATCH, &format!("api/tasks/{id}"))?
            .json(patch);
        Self::send_json(builder, "could not update task").await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), GatewayError> {
        let builder = self.request(Method::DELETE, &format!("api/tasks/{id}"))?;
        Self::send(builder, "could not delete task").await?;
        Ok(())
    }
}
