use crate::codec::SessionCodec;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::pending::{PendingAuthorization, PendingAuthorizations};
use crate::providers::GoogleProvider;
use crate::session::{now_secs, CredentialBundle};
use axum_extra::extract::cookie::Key;

/// Credentials cleared for one request
#[derive(Clone, Debug)]
pub struct Authorized {
    pub bundle: CredentialBundle,

    /// Replacement session token when the access token had to be refreshed.
    /// The old cookie is stale once this is set.
    pub refreshed_token: Option<String>,
}

/// Main authentication service
pub struct AuthService {
    pub config: AuthConfig,
    codec: SessionCodec,
    provider: GoogleProvider,
    pending: PendingAuthorizations,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let codec = match config.session.secret.as_deref() {
            Some(secret) => SessionCodec::new(secret.as_bytes())?,
            None => {
                tracing::warn!(
                    "No session secret configured; generated one for this process. \
                     Sessions will not survive a restart or be shared between instances."
                );
                SessionCodec::generate()
            }
        };
        let provider = GoogleProvider::new(&config.oauth)?;
        let pending = PendingAuthorizations::new(
            config.session.state_timeout_seconds,
            config.session.max_pending_authorizations,
        );

        Ok(Self {
            config,
            codec,
            provider,
            pending,
        })
    }

    /// Key used by the private cookie jar
    pub fn cookie_key(&self) -> Key {
        self.codec.cookie_key()
    }

    /// Sign a new session token for `bundle`
    pub fn issue_session(&self, bundle: &CredentialBundle) -> Result<String, AuthError> {
        self.codec.encode(bundle)
    }

    /// Begin the authorization-code flow.
    ///
    /// Returns the provider URL to redirect to and the state value the
    /// callback must echo back.
    pub async fn start_authorization(&self) -> (String, String) {
        let request = self.provider.authorization_request();
        self.pending
            .insert(
                request.state.clone(),
                PendingAuthorization {
                    pkce_verifier: request.pkce_verifier,
                    created_at: now_secs(),
                },
            )
            .await;
        tracing::info!("Authorization started, redirecting to provider");
        (request.url, request.state)
    }

    /// Finish the flow: consume `state`, exchange `code` and sign a session
    pub async fn complete_authorization(&self, code: &str, state: &str) -> Result<String, AuthError> {
        let pending = self.pending.take(state).await.ok_or(AuthError::InvalidState)?;
        let bundle = self.provider.exchange_code(code, &pending.pkce_verifier).await?;
        tracing::info!(scopes = bundle.granted_scopes.len(), "Authorization code exchanged");
        self.issue_session(&bundle)
    }

    /// Resolve the presented session token into usable credentials.
    ///
    /// Every failure surfaces as `AuthenticationRequired`; the caller must
    /// restart the flow at `/auth`.
    pub async fn authorize(&self, token: Option<&str>) -> Result<Authorized, AuthError> {
        let token = token.ok_or(AuthError::AuthenticationRequired)?;

        let bundle = self.codec.decode(token).map_err(|e| {
            tracing::debug!("Session validation failed: {}", e);
            AuthError::AuthenticationRequired
        })?;

        if !bundle.access_token_expired(now_secs()) {
            return Ok(Authorized {
                bundle,
                refreshed_token: None,
            });
        }

        if bundle.refresh_token.is_none() {
            tracing::debug!("Access token expired and no refresh token is available");
            return Err(AuthError::AuthenticationRequired);
        }

        let refreshed = self.provider.refresh(&bundle).await.map_err(|e| {
            match &e {
                AuthError::NetworkFault(_) => tracing::warn!("Token refresh failed: {}", e),
                _ => tracing::info!("Token refresh rejected: {}", e),
            }
            AuthError::AuthenticationRequired
        })?;

        let refreshed_token = self.issue_session(&refreshed)?;
        tracing::debug!("Access token refreshed, issuing new session token");

        Ok(Authorized {
            bundle: refreshed,
            refreshed_token: Some(refreshed_token),
        })
    }
}
