use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::config::SessionConfig;
use crate::session::SESSION_TTL_SECS;

/// Cookie binding an in-flight authorization to the browser that started it
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// Session cookie carrying the signed session token
pub fn session_cookie(config: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}

/// Removal cookie for the session
pub fn clear_session_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), "")).path("/").build()
}

/// Short-lived cookie holding the expected authorization state
pub fn state_cookie(config: &SessionConfig, state: String) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, state))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(config.state_timeout_seconds as i64))
        .build()
}

/// Removal cookie for the authorization state
pub fn clear_state_cookie() -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, "")).path("/").build()
}
