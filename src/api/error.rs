use std::time::Duration;
use thiserror::Error;

use crate::location::LocationError;

/// Backend operations a failure can be attributed to.
///
/// The same underlying error reads differently depending on what the user
/// was trying to do, so messages are chosen per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SymptomCheck,
    Chat,
    ChatHistory,
    SymptomHistory,
    NearbyHospitals,
    Login,
    Signup,
    Status,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response, with the backend's `detail` when it sent one
    #[error("HTTP {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Http { status: u16, detail: Option<String> },

    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// A request was refused locally before anything was sent
    #[error("{0}")]
    LocalPrecondition(String),

    #[error("Location unavailable: {0}")]
    LocationUnavailable(#[from] LocationError),

    /// The response body could not be parsed
    #[error("Invalid response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout(_))
    }

    /// The single human-readable message shown for this failure.
    pub fn user_message(&self, op: Operation) -> String {
        match (op, self) {
            (_, ApiError::LocalPrecondition(msg)) => msg.clone(),

            (Operation::SymptomCheck, _) => {
                "Failed to get result. Please check your connection or try again shortly."
                    .to_string()
            }

            (Operation::Chat, ApiError::Timeout(_)) => {
                "Request timed out (30s limit reached). The AI model is taking too long to respond."
                    .to_string()
            }
            (Operation::Chat, ApiError::Http { status, detail }) => detail
                .clone()
                .unwrap_or_else(|| format!("Chat API returned status {}.", status)),
            (Operation::Chat, _) => {
                "Network error. Check if the server is reachable and try again.".to_string()
            }

            (Operation::ChatHistory, ApiError::Http { detail, .. }) => detail
                .clone()
                .unwrap_or_else(|| "Failed to load chat history.".to_string()),
            (Operation::ChatHistory, _) => {
                "Failed to load chat history. Please try again later.".to_string()
            }

            (Operation::SymptomHistory, ApiError::Http { detail, .. }) => detail
                .clone()
                .unwrap_or_else(|| "Failed to load symptom history.".to_string()),
            (Operation::SymptomHistory, _) => {
                "Failed to load symptom history. Please try again later.".to_string()
            }

            (Operation::NearbyHospitals, ApiError::LocationUnavailable(e)) => e.user_message(),
            (Operation::NearbyHospitals, ApiError::Http { detail, .. }) => detail
                .clone()
                .unwrap_or_else(|| "Hospitals API error.".to_string()),
            (Operation::NearbyHospitals, _) => {
                "Failed to fetch nearby hospitals. Please try again.".to_string()
            }

            (Operation::Login, ApiError::Http { detail, .. }) => {
                detail.clone().unwrap_or_else(|| "Login failed.".to_string())
            }
            (Operation::Signup, ApiError::Http { detail, .. }) => {
                detail.clone().unwrap_or_else(|| "Sign up failed.".to_string())
            }
            (Operation::Login | Operation::Signup, _) => {
                "Could not reach the server. Please try again.".to_string()
            }

            (Operation::Status, e) => format!("Backend unavailable: {}", e),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
