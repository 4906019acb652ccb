use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    NotFound,
    Validation,
    SlotUnavailable,
    Conflict,
    RateLimited,
    Internal,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Error payload reported by the scheduling service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    #[serde(default)]
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// The `error` member of a failed service reply. Hosted functions report either a
/// bare string or a structured `{ code, message }` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Structured(ApiError),
    Message(String),
}

impl ErrorDetail {
    pub fn message(&self) -> &str {
        match self {
            ErrorDetail::Structured(err) => &err.message,
            ErrorDetail::Message(message) => message,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ErrorDetail::Structured(err) => err.code,
            ErrorDetail::Message(_) => ErrorCode::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceErrorPayload {
    pub error: ErrorDetail,
}

impl From<ApiError> for ServiceErrorPayload {
    fn from(value: ApiError) -> Self {
        Self {
            error: ErrorDetail::Structured(value),
        }
    }
}
