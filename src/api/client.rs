use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{
    BackendStatus, ChatHistoryEntry, ChatRequest, Credentials, ErrorBody, Hospital,
    NearbyHospitalsRequest, Session, SymptomCheckRequest, SymptomCheckResult,
    SymptomHistoryEntry,
};
use crate::location::Coordinates;

/// Deadline for a chat exchange. After it the request is dropped.
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_HOSPITAL_RADIUS_METERS: u32 = 10_000;

/// Shown in place of a reply the backend sent empty or malformed
pub const EMPTY_REPLY_PLACEHOLDER: &str =
    "Error: Received empty or invalid response format from backend.";

pub const USER_ID_HEADER: &str = "X-User-Id";

/// The backend operations the client depends on.
#[async_trait]
pub trait HealthApi: Send + Sync {
    async fn check_symptoms(
        &self,
        payload: &SymptomCheckRequest,
        user_id: Option<i64>,
    ) -> ApiResult<SymptomCheckResult>;

    /// Returns the assistant's reply. A missing or blank reply is replaced
    /// by [`EMPTY_REPLY_PLACEHOLDER`] rather than reported as a failure.
    async fn send_chat_message(&self, text: &str, user_id: Option<i64>) -> ApiResult<String>;

    /// Fails locally, without a request, when `user_id` is `None`
    async fn load_chat_history(&self, user_id: Option<i64>) -> ApiResult<Vec<ChatHistoryEntry>>;

    /// Fails locally, without a request, when `user_id` is `None`
    async fn load_symptom_history(
        &self,
        user_id: Option<i64>,
    ) -> ApiResult<Vec<SymptomHistoryEntry>>;

    async fn find_nearby_hospitals(
        &self,
        coords: Coordinates,
        radius_meters: u32,
    ) -> ApiResult<Vec<Hospital>>;

    async fn login(&self, credentials: &Credentials) -> ApiResult<Session>;

    async fn signup(&self, credentials: &Credentials) -> ApiResult<Session>;

    async fn backend_status(&self) -> ApiResult<BackendStatus>;
}

/// HTTP implementation of [`HealthApi`]
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    chat_timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            chat_timeout: CHAT_TIMEOUT,
        }
    }

    /// Override the chat deadline (defaults to [`CHAT_TIMEOUT`])
    pub fn with_chat_timeout(mut self, timeout: Duration) -> Self {
        self.chat_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_identity(builder: RequestBuilder, user_id: Option<i64>) -> RequestBuilder {
        match user_id {
            Some(id) => builder.header(USER_ID_HEADER, id.to_string()),
            None => builder,
        }
    }

    fn require_identity(user_id: Option<i64>, message: &str) -> ApiResult<i64> {
        user_id.ok_or_else(|| ApiError::LocalPrecondition(message.to_string()))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Turn a non-success response into an error, optionally reading the
    /// backend's `detail` field from the body.
    async fn http_error(response: Response, read_detail: bool) -> ApiError {
        let status = response.status().as_u16();
        let detail = if read_detail {
            match response.bytes().await {
                Ok(bytes) => serde_json::from_slice::<ErrorBody>(&bytes)
                    .ok()
                    .and_then(|body| body.detail)
                    .and_then(|detail| detail_text(&detail)),
                Err(_) => None,
            }
        } else {
            None
        };
        debug!(target: "api", "HTTP {} (detail: {:?})", status, detail);
        ApiError::Http { status, detail }
    }

    async fn send_json<T: DeserializeOwned>(
        builder: RequestBuilder,
        read_detail: bool,
    ) -> ApiResult<T> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(Self::http_error(response, read_detail).await);
        }
        Self::read_json(response).await
    }

    async fn chat_exchange(&self, text: &str, user_id: Option<i64>) -> ApiResult<Value> {
        let builder = Self::with_identity(self.client.post(self.url("/api/chat")), user_id)
            .json(&ChatRequest { message: text });
        Self::send_json(builder, true).await
    }
}

/// FastAPI sends either a string or a list of validation errors
fn detail_text(detail: &Value) -> Option<String> {
    match detail {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// The reply text, if the body carries a non-blank string `reply`
pub fn extract_reply(body: &Value) -> Option<String> {
    body.get("reply")
        .and_then(Value::as_str)
        .filter(|reply| !reply.trim().is_empty())
        .map(str::to_string)
}

#[async_trait]
impl HealthApi for ApiClient {
    async fn check_symptoms(
        &self,
        payload: &SymptomCheckRequest,
        user_id: Option<i64>,
    ) -> ApiResult<SymptomCheckResult> {
        debug!(target: "api", "POST /api/symptom-check (user: {:?})", user_id);
        let builder = Self::with_identity(self.client.post(self.url("/api/symptom-check")), user_id)
            .json(payload);
        Self::send_json(builder, false).await
    }

    async fn send_chat_message(&self, text: &str, user_id: Option<i64>) -> ApiResult<String> {
        debug!(target: "api", "POST /api/chat (user: {:?})", user_id);

        // Dropping the exchange future on expiry cancels the in-flight request
        let body = match tokio::time::timeout(self.chat_timeout, self.chat_exchange(text, user_id))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(target: "api", "Chat request exceeded {:?}, cancelled", self.chat_timeout);
                return Err(ApiError::Timeout(self.chat_timeout));
            }
        };

        match extract_reply(&body) {
            Some(reply) => Ok(reply),
            None => {
                // Backend contract violation; substituted, not propagated
                warn!(target: "api", "Chat response had no usable reply field: {}", body);
                Ok(EMPTY_REPLY_PLACEHOLDER.to_string())
            }
        }
    }

    async fn load_chat_history(&self, user_id: Option<i64>) -> ApiResult<Vec<ChatHistoryEntry>> {
        let user_id =
            Self::require_identity(user_id, "Please log in to view your chat history.")?;
        debug!(target: "api", "GET /api/chat-history (user: {})", user_id);
        let builder = Self::with_identity(self.client.get(self.url("/api/chat-history")), Some(user_id));
        Self::send_json(builder, true).await
    }

    async fn load_symptom_history(
        &self,
        user_id: Option<i64>,
    ) -> ApiResult<Vec<SymptomHistoryEntry>> {
        let user_id =
            Self::require_identity(user_id, "Please log in to view your symptom history.")?;
        debug!(target: "api", "GET /api/symptom-history (user: {})", user_id);
        let builder =
            Self::with_identity(self.client.get(self.url("/api/symptom-history")), Some(user_id));
        Self::send_json(builder, true).await
    }

    async fn find_nearby_hospitals(
        &self,
        coords: Coordinates,
        radius_meters: u32,
    ) -> ApiResult<Vec<Hospital>> {
        debug!(
            target: "api",
            "POST /api/nearby-hospitals ({}, {}) r={}m",
            coords.latitude, coords.longitude, radius_meters
        );
        let builder = self
            .client
            .post(self.url("/api/nearby-hospitals"))
            .json(&NearbyHospitalsRequest {
                latitude: coords.latitude,
                longitude: coords.longitude,
                radius_meters,
            });
        Self::send_json(builder, true).await
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        debug!(target: "api", "POST /api/login ({})", credentials.email);
        let builder = self.client.post(self.url("/api/login")).json(credentials);
        Self::send_json(builder, true).await
    }

    async fn signup(&self, credentials: &Credentials) -> ApiResult<Session> {
        debug!(target: "api", "POST /api/signup ({})", credentials.email);
        let builder = self.client.post(self.url("/api/signup")).json(credentials);
        Self::send_json(builder, true).await
    }

    async fn backend_status(&self) -> ApiResult<BackendStatus> {
        Self::send_json(self.client.get(self.url("/")), false).await
    }
}
