//! HTTP surface: the asynchronous action endpoint that answers count queries,
//! the patched navigation page and the browser configuration.
//!
//! Every action response uses the `{ "success": bool, "data": ... }` envelope
//! the client expects, failures included, so a rejected request is a result
//! for the caller rather than a transport fault.

pub mod app;
pub mod handlers;
pub mod state;

use crate::core::BadgeError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub use app::build_router;
pub use state::AppState;

/// `{ "success": ..., "data": ... }` response envelope.
#[derive(Debug, Serialize)]
pub struct AjaxResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> AjaxResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FailureData {
    pub reason: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub enum WebError {
    InvalidNonce,
    MissingAction,
    UnknownAction(String),
    Input(String),
    Unavailable(String),
    Internal(String),
}

impl From<BadgeError> for WebError {
    fn from(err: BadgeError) -> Self {
        match err {
            BadgeError::InvalidNonce => WebError::InvalidNonce,
            BadgeError::UnknownAction(action) => WebError::UnknownAction(action),
            BadgeError::StoreUnavailable(msg) => WebError::Unavailable(msg),
            other => WebError::Internal(other.to_string()),
        }
    }
}

impl WebError {
    fn parts(self) -> (StatusCode, &'static str, String) {
        match self {
            WebError::InvalidNonce => (
                StatusCode::FORBIDDEN,
                "invalid_nonce",
                "anti-forgery token missing or invalid".to_string(),
            ),
            WebError::MissingAction => (
                StatusCode::BAD_REQUEST,
                "missing_action",
                "action is required".to_string(),
            ),
            WebError::UnknownAction(action) => (
                StatusCode::BAD_REQUEST,
                "unknown_action",
                format!("unknown action '{action}'"),
            ),
            WebError::Input(msg) => (StatusCode::BAD_REQUEST, "input_error", msg),
            WebError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg),
            WebError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, reason, message) = self.parts();

        let body = Json(AjaxResponse {
            success: false,
            data: FailureData { reason, message },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
