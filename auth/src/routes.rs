use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;

use crate::cookies::{self, OAUTH_STATE_COOKIE};
use crate::error::AuthError;
use crate::AuthState;

#[derive(Deserialize)]
struct AuthCallback {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/auth", get(start))
        .route("/oauth2callback", get(callback))
        .route("/logout", get(logout))
}

async fn start(
    State(auth_state): State<AuthState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Response) {
    let (auth_url, state) = auth_state.start_authorization().await;
    let jar = jar.add(cookies::state_cookie(&auth_state.config.session, state));

    (
        jar,
        (StatusCode::FOUND, [(header::LOCATION, auth_url)]).into_response(),
    )
}

async fn callback(
    State(auth_state): State<AuthState>,
    jar: PrivateCookieJar,
    Query(query): Query<AuthCallback>,
) -> (PrivateCookieJar, Response) {
    let expected_state = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    // The state cookie is spent whatever the outcome
    let jar = jar.remove(cookies::clear_state_cookie());

    match finish_callback(&auth_state, &query, expected_state.as_deref()).await {
        Ok(token) => {
            let jar = jar.add(cookies::session_cookie(&auth_state.config.session, token));
            let body = serde_json::json!({
                "success": true,
                "message": "Authentication successful! You can now create Google Documents and Sheets.",
            });
            (jar, Json(body).into_response())
        }
        Err(e) => (jar, e.into_response()),
    }
}

async fn finish_callback(
    auth_state: &AuthState,
    query: &AuthCallback,
    expected_state: Option<&str>,
) -> Result<String, AuthError> {
    if let Some(error) = &query.error {
        let description = query.error_description.as_deref().unwrap_or("no description");
        tracing::error!("Google OAuth error: {} - {}", error, description);
        return Err(AuthError::ExchangeFailed(format!("{}: {}", error, description)));
    }

    let code = query.code.as_deref().ok_or(AuthError::MissingParameter("code"))?;
    let state = query.state.as_deref().ok_or(AuthError::MissingParameter("state"))?;

    if expected_state != Some(state) {
        tracing::warn!("OAuth callback state does not match the state cookie");
        return Err(AuthError::InvalidState);
    }

    auth_state.complete_authorization(code, state).await
}

async fn logout(
    State(auth_state): State<AuthState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Json<serde_json::Value>) {
    let jar = jar.remove(cookies::clear_session_cookie(&auth_state.config.session));

    (
        jar,
        Json(serde_json::json!({
            "success": true,
            "message": "Logged out successfully",
        })),
    )
}
