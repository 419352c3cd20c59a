use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;

use crate::cookies;
use crate::session::CredentialBundle;
use crate::AuthState;

/// Credentials of the caller, inserted into request extensions by
/// [`require_session`]
#[derive(Clone, Debug)]
pub struct AuthorizedSession {
    pub bundle: CredentialBundle,
}

/// Middleware to require a valid session.
///
/// Rejects with 401 when the session is absent or unusable. When the access
/// token had to be refreshed, the replacement session cookie is attached to
/// whatever response the inner handler produces.
pub async fn require_session(
    State(auth_state): State<AuthState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar
        .get(&auth_state.config.session.cookie_name)
        .map(|c| c.value().to_string());

    let authorized = match auth_state.authorize(token.as_deref()).await {
        Ok(authorized) => authorized,
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(AuthorizedSession {
        bundle: authorized.bundle,
    });
    let response = next.run(request).await;

    match authorized.refreshed_token {
        Some(token) => {
            let jar = jar.add(cookies::session_cookie(&auth_state.config.session, token));
            (jar, response).into_response()
        }
        None => response,
    }
}
