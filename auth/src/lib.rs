//! Google OAuth2 sign-in with stateless, signed session cookies.
//!
//! The authorization-code flow (`/auth` → provider → `/oauth2callback`)
//! ends with the user's delegated credentials sealed in a signed session
//! token, carried by the client in an encrypted cookie. Protected routes use
//! [`require_session`] to turn that cookie back into a [`CredentialBundle`],
//! refreshing the access token when it has expired.
//!
//! # Example
//!
//! ```no_run
//! use drive_relay_auth::{auth_routes, AuthConfig, AuthService, AuthState};
//! use std::sync::Arc;
//!
//! let config = AuthConfig::default().with_public_url("http://localhost:3333");
//! let auth_service = Arc::new(AuthService::new(config).unwrap());
//! let auth_state = AuthState::new(auth_service);
//! let router: axum::Router = auth_routes().with_state(auth_state);
//! ```

pub mod codec;
pub mod config;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod pending;
pub mod providers;
pub mod routes;
pub mod service;
pub mod session;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use std::ops::Deref;
use std::sync::Arc;

// Re-export commonly used types
pub use codec::SessionCodec;
pub use config::AuthConfig;
pub use error::AuthError;
pub use middleware::{require_session, AuthorizedSession};
pub use routes::auth_routes;
pub use service::{AuthService, Authorized};
pub use session::CredentialBundle;

/// State wrapper for AuthService that implements FromRef for Key
/// This allows PrivateCookieJar to extract the cookie key from state
#[derive(Clone)]
pub struct AuthState {
    inner: Arc<AuthService>,
}

impl AuthState {
    pub fn new(auth_service: Arc<AuthService>) -> Self {
        Self {
            inner: auth_service,
        }
    }
}

impl Deref for AuthState {
    type Target = AuthService;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Implement FromRef to allow PrivateCookieJar to extract Key from AuthState
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key()
    }
}
