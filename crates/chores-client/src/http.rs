use std::time::Duration;

use async_trait::async_trait;
use chores_common::config::ServerConfig;
use chores_common::pin::Pin;
use chores_common::{Child, ChildId, Chore, ChoreId, Frequency};
use chores_proto::{
    paths, Ack, AuthResponse, ChildHistoryResponse, ChildUpdate, ChoreUpdate, Completion,
    ErrorBody, HistoryQuery, HistoryResponse, NewChild, NewChore, PinExists, SetPinData,
    SetPinRequest, VerifyPinData, VerifyPinRequest,
};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::ChoresApi;
use crate::error::ApiError;

/// [`ChoresApi`] over HTTP/JSON.
#[derive(Clone)]
pub struct HttpClient {
    http: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, None)
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, ApiError> {
        Self::with_timeout(&config.base_url, config.request_timeout_secs.map(Duration::from_secs))
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self { http: builder.build()?, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("{} {}", method, path);
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// Send and decode, turning any non-success status into [`ApiError::Status`].
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|body| body.error)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
            debug!("Server rejected request with {}: {}", status, message);
            return Err(ApiError::status(status.as_u16(), message));
        }

        Ok(serde_json::from_slice(&body)?)
    }

    /// Send and decode regardless of status, reporting success through `ok`.
    async fn fetch_auth<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<AuthResponse<T>, ApiError> {
        let response = request.send().await?;
        let ok = response.status().is_success();
        let body = response.bytes().await?;

        Ok(AuthResponse { ok, data: serde_json::from_slice(&body)? })
    }
}

#[async_trait]
impl ChoresApi for HttpClient {
    async fn pin_exists(&self) -> Result<PinExists, ApiError> {
        self.fetch(self.request(Method::GET, paths::PIN_EXISTS)).await
    }

    async fn verify_pin(&self, pin: &Pin) -> Result<AuthResponse<VerifyPinData>, ApiError> {
        let body = VerifyPinRequest { pin: pin.expose() };
        self.fetch_auth(self.request(Method::POST, paths::VERIFY_PIN).json(&body)).await
    }

    async fn set_pin(
        &self,
        pin: &Pin,
        current_pin: Option<&Pin>,
    ) -> Result<AuthResponse<SetPinData>, ApiError> {
        let body = SetPinRequest {
            pin: pin.expose(),
            current_pin: current_pin.filter(|p| !p.is_empty()).map(Pin::expose),
        };
        self.fetch_auth(self.request(Method::POST, paths::SET_PIN).json(&body)).await
    }

    async fn get_children(&self) -> Result<Vec<Child>, ApiError> {
        self.fetch(self.request(Method::GET, paths::CHILDREN)).await
    }

    async fn get_child(&self, id: ChildId) -> Result<Child, ApiError> {
        self.fetch(self.request(Method::GET, &paths::child(id))).await
    }

    async fn create_child(&self, name: &str) -> Result<Child, ApiError> {
        self.fetch(self.request(Method::POST, paths::CHILDREN).json(&NewChild { name })).await
    }

    async fn update_child(&self, id: ChildId, update: &ChildUpdate) -> Result<Child, ApiError> {
        self.fetch(self.request(Method::PUT, &paths::child(id)).json(update)).await
    }

    async fn delete_child(&self, id: ChildId) -> Result<Ack, ApiError> {
        self.fetch(self.request(Method::DELETE, &paths::child(id))).await
    }

    async fn get_chores(&self, child_id: ChildId) -> Result<Vec<Chore>, ApiError> {
        self.fetch(self.request(Method::GET, &paths::child_chores(child_id))).await
    }

    async fn create_chore(
        &self,
        child_id: ChildId,
        title: &str,
        frequency: Frequency,
    ) -> Result<Chore, ApiError> {
        let body = NewChore { title, frequency };
        self.fetch(self.request(Method::POST, &paths::child_chores(child_id)).json(&body)).await
    }

    async fn update_chore(
        &self,
        chore_id: ChoreId,
        update: &ChoreUpdate,
    ) -> Result<Chore, ApiError> {
        self.fetch(self.request(Method::PUT, &paths::chore(chore_id)).json(update)).await
    }

    async fn delete_chore(&self, chore_id: ChoreId) -> Result<Ack, ApiError> {
        self.fetch(self.request(Method::DELETE, &paths::chore(chore_id))).await
    }

    async fn complete_chore(&self, chore_id: ChoreId) -> Result<Completion, ApiError> {
        self.fetch(self.request(Method::POST, &paths::chore_completion(chore_id))).await
    }

    async fn uncomplete_chore(&self, chore_id: ChoreId) -> Result<Ack, ApiError> {
        self.fetch(self.request(Method::DELETE, &paths::chore_completion(chore_id))).await
    }

    async fn get_history(&self, query: &HistoryQuery) -> Result<HistoryResponse, ApiError> {
        let mut params = vec![("days", query.days.to_string())];
        if let Some(child_id) = query.child_id {
            params.push(("child_id", child_id.to_string()));
        }
        self.fetch(self.request(Method::GET, paths::HISTORY).query(&params)).await
    }

    async fn get_child_history(
        &self,
        child_id: ChildId,
        days: Option<u32>,
    ) -> Result<ChildHistoryResponse, ApiError> {
        let mut request = self.request(Method::GET, &paths::child_history(child_id));
        if let Some(days) = days {
            request = request.query(&[("days", days.to_string())]);
        }
        self.fetch(request).await
    }
}
