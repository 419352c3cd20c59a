use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Message shown to clients that need to (re)run the OAuth flow
pub const AUTH_REQUIRED_MESSAGE: &str =
    "Google authentication required. Please visit /auth to authenticate.";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Session expired")]
    ExpiredSession,

    #[error("Invalid session")]
    InvalidSession,

    #[error("Authorization state is missing, unknown or already used")]
    InvalidState,

    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Token refresh rejected: {0}")]
    RefreshRejected(String),

    #[error("Network fault talking to the identity provider: {0}")]
    NetworkFault(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Session token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Short machine-readable kind used in JSON error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::AuthenticationRequired
            | AuthError::ExpiredSession
            | AuthError::InvalidSession
            | AuthError::RefreshRejected(_) => "authentication_required",
            AuthError::InvalidState => "invalid_state",
            AuthError::MissingParameter(_) => "missing_parameter",
            AuthError::ExchangeFailed(_) => "exchange_failed",
            AuthError::NetworkFault(_) => "network_fault",
            AuthError::ConfigError(_) | AuthError::UrlError(_) | AuthError::TokenError(_) => {
                "internal_error"
            }
        }
    }
}

impl From<&AuthError> for StatusCode {
    fn from(error: &AuthError) -> StatusCode {
        match error {
            AuthError::AuthenticationRequired
            | AuthError::ExpiredSession
            | AuthError::InvalidSession
            | AuthError::RefreshRejected(_) => StatusCode::UNAUTHORIZED,
            AuthError::InvalidState | AuthError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            AuthError::ExchangeFailed(_)
            | AuthError::NetworkFault(_)
            | AuthError::ConfigError(_)
            | AuthError::UrlError(_)
            | AuthError::TokenError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for StatusCode {
    fn from(error: AuthError) -> StatusCode {
        StatusCode::from(&error)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        let message = match status {
            StatusCode::UNAUTHORIZED => AUTH_REQUIRED_MESSAGE.to_string(),
            _ => self.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Authentication flow failed");
        }

        let body = serde_json::json!({
            "success": false,
            "error": self.kind(),
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_failures_map_to_unauthorized() {
        assert_eq!(StatusCode::from(AuthError::ExpiredSession), StatusCode::UNAUTHORIZED);
        assert_eq!(StatusCode::from(AuthError::InvalidSession), StatusCode::UNAUTHORIZED);
        assert_eq!(
            StatusCode::from(AuthError::AuthenticationRequired),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_exchange_failure_is_server_error() {
        let err = AuthError::ExchangeFailed("invalid_grant".to_string());
        assert_eq!(StatusCode::from(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "exchange_failed");
    }

    #[test]
    fn test_state_mismatch_is_bad_request() {
        assert_eq!(StatusCode::from(AuthError::InvalidState), StatusCode::BAD_REQUEST);
    }
}
