//! JSON error responses.

use crate::error::{AnalysisError, FeedError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

/// Error returned by API handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// The request itself is unusable (400).
    BadRequest(String),
    /// The telemetry feed or the LLM API failed (502).
    Upstream(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(m) | ApiError::Upstream(m) => m,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self.message());
        } else {
            warn!("Rejected request: {}", self.message());
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<FeedError> for ApiError {
    fn from(e: FeedError) -> Self {
        match e {
            FeedError::InvalidHour { .. } => ApiError::BadRequest(e.to_string()),
            _ => ApiError::Upstream(e.to_string()),
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::MissingCredential | AnalysisError::MissingQuestion => {
                ApiError::BadRequest(e.to_string())
            }
            _ => ApiError::Upstream(format!("Analysis error: {}", e)),
        }
    }
}
