//! HTTP error responses and extractors that reject with them.

use crate::error::FocusTubeError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

/// An error rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, what)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<FocusTubeError> for ApiError {
    fn from(err: FocusTubeError) -> Self {
        let status = match &err {
            FocusTubeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            FocusTubeError::NotFound(_) => StatusCode::NOT_FOUND,
            FocusTubeError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match err {
            FocusTubeError::InvalidInput(message) | FocusTubeError::NotFound(message) => {
                Self::new(status, message)
            }
            other => Self::new(status, other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, "{}", self.message);
        } else {
            warn!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// JSON body extractor rejecting with [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor rejecting with [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameter extractor rejecting with [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (FocusTubeError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (FocusTubeError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (FocusTubeError::Config("no key".into()), StatusCode::SERVICE_UNAVAILABLE),
            (FocusTubeError::YouTube("403".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (FocusTubeError::Storage("poisoned".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_malformed_upstream_json_is_server_error() {
        // Client bodies are rejected by ApiJson; a Json error here comes from an upstream reply.
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let api = ApiError::from(FocusTubeError::from(err));
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_input_message_is_unprefixed() {
        let err = ApiError::from(FocusTubeError::InvalidInput("title is required".into()));
        assert_eq!(err.message, "title is required");
    }
}
