use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::drive::{DriveError, ResourceKind};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to create {kind}: {source}")]
    Creation {
        kind: &'static str,
        #[source]
        source: DriveError,
    },
}

impl ApiError {
    pub fn creation(kind: ResourceKind, source: DriveError) -> Self {
        ApiError::Creation {
            kind: match kind {
                ResourceKind::Document => "document",
                ResourceKind::Sheet => "sheet",
            },
            source,
        }
    }
}

/// Body extraction failures (bad JSON, wrong content type) are client errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected request body: {}", rejection.body_text());
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidRequest(message) => {
                let body = serde_json::json!({
                    "success": false,
                    "error": "invalid_request",
                    "message": message,
                });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Creation { kind, source } => {
                let (upstream_status, detail) = match &source {
                    DriveError::Upstream { status, message } => (Some(*status), message.clone()),
                    DriveError::Network(e) => (None, e.to_string()),
                };
                tracing::error!("Failed to create {}: {}", kind, source);

                let body = serde_json::json!({
                    "success": false,
                    "error": "upstream_failure",
                    "status": upstream_status,
                    "message": format!("Failed to create {}: {}", kind, detail),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
