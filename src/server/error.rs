//! Mapping of domain errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::chat::{llm::LlmError, ChatError};
use crate::facial::ClassifierError;
use crate::mood::MoodError;
use crate::user::UserError;

/// An error answered as `{"error": message}` with `status`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    fn internal(err: impl std::fmt::Display) -> Self {
        error!("Internal error: {}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!("{} {}", self.status, self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<MoodError> for ApiError {
    fn from(e: MoodError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::UserNotFound | UserError::MoodEntryNotFound => {
                ApiError::not_found(e.to_string())
            }
            UserError::InvalidCredentials => ApiError::new(StatusCode::UNAUTHORIZED, e.to_string()),
            UserError::EmailTaken | UserError::HandleTaken | UserError::Invalid(_) => {
                ApiError::bad_request(e.to_string())
            }
            UserError::Store(e) => ApiError::internal(e),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::UserNotFound => ApiError::not_found(e.to_string()),
            ChatError::Invalid(_) => ApiError::bad_request(e.to_string()),
            ChatError::AgentUnavailable => ApiError::unavailable(e.to_string()),
            ChatError::Llm(LlmError::Timeout) => {
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, e.to_string())
            }
            ChatError::Llm(_) => ApiError::new(StatusCode::BAD_GATEWAY, e.to_string()),
            ChatError::Store(e) => ApiError::internal(e),
        }
    }
}

impl From<ClassifierError> for ApiError {
    fn from(e: ClassifierError) -> Self {
        match e {
            ClassifierError::InvalidImage(_) => ApiError::bad_request(e.to_string()),
            ClassifierError::PredictionFailed => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ClassifierError::Unavailable(_) | ClassifierError::UnknownLabel(_) => {
                ApiError::new(StatusCode::BAD_GATEWAY, e.to_string())
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_errors_to_statuses() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                MoodError::UnknownEmotion("ecstatic".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (MoodError::EmptyBandData.into(), StatusCode::BAD_REQUEST),
            (UserError::UserNotFound.into(), StatusCode::NOT_FOUND),
            (UserError::InvalidCredentials.into(), StatusCode::UNAUTHORIZED),
            (UserError::EmailTaken.into(), StatusCode::BAD_REQUEST),
            (ChatError::AgentUnavailable.into(), StatusCode::SERVICE_UNAVAILABLE),
            (
                ChatError::Llm(LlmError::RateLimited).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ClassifierError::PredictionFailed.into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ClassifierError::Unavailable("down".into()).into(),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status, status, "{}", err.message);
        }
    }

    #[test]
    fn store_failures_do_not_leak_details() {
        let err: ApiError = UserError::Store(anyhow::anyhow!("disk I/O error at /var/db")).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }
}
