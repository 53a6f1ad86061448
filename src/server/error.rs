use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Every failed token request is answered with 400 and this body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    /// `context` is prepended to the error text, e.g. "error generating RTC token".
    pub fn bad_request(context: &str, err: impl std::fmt::Display) -> Self {
        Self {
            message: format!("{}: {}", context, err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;
        (
            status,
            Json(ErrorResponse {
                status: status.as_u16(),
                message: self.message,
            }),
        )
            .into_response()
    }
}
