//! JSON error responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bankpanel_core::error::BankPanelError;
use serde_json::json;
use std::fmt;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<BankPanelError> for ApiError {
    fn from(err: BankPanelError) -> Self {
        let status = match &err {
            BankPanelError::Validation(_) | BankPanelError::Identity(_) => StatusCode::BAD_REQUEST,
            BankPanelError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            BankPanelError::Forbidden(_) => StatusCode::FORBIDDEN,
            BankPanelError::NotFound(_) => StatusCode::NOT_FOUND,
            BankPanelError::Store(_)
            | BankPanelError::Provision(_)
            | BankPanelError::Config(_)
            | BankPanelError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("{err}");
        }
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (BankPanelError::validation("x"), StatusCode::BAD_REQUEST),
            (BankPanelError::identity("x"), StatusCode::BAD_REQUEST),
            (BankPanelError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (BankPanelError::forbidden("x"), StatusCode::FORBIDDEN),
            (BankPanelError::not_found("x"), StatusCode::NOT_FOUND),
            (BankPanelError::store("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (BankPanelError::provision("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_identity_message_kept_verbatim() {
        let e = ApiError::from(BankPanelError::identity("Email rate limit exceeded"));
        assert_eq!(e.message, "Email rate limit exceeded");
    }
}
