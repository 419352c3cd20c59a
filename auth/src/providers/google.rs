use crate::config::OAuthConfig;
use crate::error::AuthError;
use crate::session::{now_secs, CredentialBundle};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, RefreshToken, RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Lifetime assumed when the provider omits `expires_in`
const DEFAULT_ACCESS_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Authorization redirect built by [`GoogleProvider::authorization_request`]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub pkce_verifier: String,
}

/// Client for the identity provider's authorization and token endpoints
pub struct GoogleProvider {
    client: BasicClient,
    auth_url: AuthUrl,
    token_url: Url,
    client_id: String,
    client_secret: String,
    scopes: Vec<String>,
    timeout: Duration,
}

impl GoogleProvider {
    pub fn new(config: &OAuthConfig) -> Result<Self, AuthError> {
        let client_id = config.client_id.as_ref()
            .ok_or_else(|| AuthError::ConfigError("Google client_id not configured".to_string()))?
            .clone();
        let client_secret = config.client_secret.as_ref()
            .ok_or_else(|| AuthError::ConfigError("Google client_secret not configured".to_string()))?
            .clone();
        let redirect_url = config.redirect_url.as_ref()
            .ok_or_else(|| AuthError::ConfigError("Google redirect_url not configured".to_string()))?
            .clone();

        let auth_url = AuthUrl::new(config.auth_url.clone())?;
        let token_url = Url::parse(&config.token_url)?;

        let client = BasicClient::new(
            ClientId::new(client_id.clone()),
            Some(ClientSecret::new(client_secret.clone())),
            auth_url.clone(),
            Some(TokenUrl::from_url(token_url.clone())),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(RedirectUrl::new(redirect_url)?);

        Ok(Self {
            client,
            auth_url,
            token_url,
            client_id,
            client_secret,
            scopes: config.scopes.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    /// Build the consent URL with a fresh CSRF state and PKCE challenge.
    ///
    /// Offline access is requested so that the callback yields a refresh token.
    pub fn authorization_request(&self) -> AuthorizationRequest {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(pkce_challenge)
            .url();

        AuthorizationRequest {
            url: auth_url.to_string(),
            state: csrf_state.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        }
    }

    /// Exchange an authorization code for credentials. Codes are single-use,
    /// so any failure here is final for this attempt.
    pub async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<CredentialBundle, AuthError> {
        let request = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(async_http_client);

        let token = self
            .with_timeout(request)
            .await
            .map_err(|_| AuthError::ExchangeFailed("token endpoint timed out".to_string()))?
            .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?;

        Ok(self.bundle_from_response(&token, None))
    }

    /// Obtain a fresh access token for `bundle` from the endpoint recorded in it
    pub async fn refresh(&self, bundle: &CredentialBundle) -> Result<CredentialBundle, AuthError> {
        let refresh_token = bundle.refresh_token.as_ref()
            .ok_or_else(|| AuthError::RefreshRejected("no refresh token".to_string()))?;

        let client = BasicClient::new(
            ClientId::new(bundle.client_id.clone()),
            Some(ClientSecret::new(bundle.client_secret.clone())),
            self.auth_url.clone(),
            Some(TokenUrl::from_url(bundle.token_endpoint.clone())),
        )
        .set_auth_type(AuthType::RequestBody);

        let refresh_token = RefreshToken::new(refresh_token.clone());
        let request = client
            .exchange_refresh_token(&refresh_token)
            .request_async(async_http_client);

        let token = self
            .with_timeout(request)
            .await
            .map_err(|_| AuthError::NetworkFault("token endpoint timed out".to_string()))?
            .map_err(|e| match e {
                RequestTokenError::ServerResponse(resp) => {
                    AuthError::RefreshRejected(resp.to_string())
                }
                other => AuthError::NetworkFault(other.to_string()),
            })?;

        Ok(self.bundle_from_response(&token, Some(bundle)))
    }

    async fn with_timeout<F: Future>(&self, fut: F) -> Result<F::Output, tokio::time::error::Elapsed> {
        tokio::time::timeout(self.timeout, fut).await
    }

    /// Build a bundle from a token response. On refresh, fields the provider
    /// did not repeat are carried over from the previous bundle.
    fn bundle_from_response(
        &self,
        token: &BasicTokenResponse,
        previous: Option<&CredentialBundle>,
    ) -> CredentialBundle {
        let lifetime = token
            .expires_in()
            .map(|d| d.as_secs())
            .unwrap_or(DEFAULT_ACCESS_TOKEN_LIFETIME_SECS);

        let granted_scopes: BTreeSet<String> = match token.scopes() {
            Some(scopes) => scopes.iter().map(|s| s.to_string()).collect(),
            None => previous
                .map(|p| p.granted_scopes.clone())
                .unwrap_or_else(|| self.scopes.iter().cloned().collect()),
        };

        let refresh_token = token
            .refresh_token()
            .map(|t| t.secret().clone())
            .or_else(|| previous.and_then(|p| p.refresh_token.clone()));

        let (token_endpoint, client_id, client_secret) = match previous {
            Some(p) => (p.token_endpoint.clone(), p.client_id.clone(), p.client_secret.clone()),
            None => (self.token_url.clone(), self.client_id.clone(), self.client_secret.clone()),
        };

        CredentialBundle {
            access_token: token.access_token().secret().clone(),
            refresh_token,
            token_endpoint,
            client_id,
            client_secret,
            granted_scopes,
            expiry: now_secs() + lifetime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::sample_bundle;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base: &str) -> OAuthConfig {
        OAuthConfig {
            client_id: Some("client-123".to_string()),
            client_secret: Some("secret-456".to_string()),
            auth_url: format!("{}/o/oauth2/v2/auth", base),
            token_url: format!("{}/token", base),
            redirect_url: Some("http://localhost:3333/oauth2callback".to_string()),
            ..OAuthConfig::default()
        }
    }

    #[test]
    fn test_missing_client_id_is_config_error() {
        let mut cfg = config("https://accounts.example.com");
        cfg.client_id = None;
        assert!(matches!(GoogleProvider::new(&cfg), Err(AuthError::ConfigError(_))));
    }

    #[test]
    fn test_authorization_request_carries_client_and_redirect() {
        let provider = GoogleProvider::new(&config("https://accounts.example.com")).unwrap();
        let request = provider.authorization_request();
        let url = Url::parse(&request.url).unwrap();

        assert_eq!(url.path(), "/o/oauth2/v2/auth");
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["redirect_uri"], "http://localhost:3333/oauth2callback");
        assert_eq!(params["state"], request.state);
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["code_challenge_method"], "S256");
        assert!(params["scope"].contains("https://www.googleapis.com/auth/drive"));
    }

    #[test]
    fn test_each_request_has_a_fresh_state() {
        let provider = GoogleProvider::new(&config("https://accounts.example.com")).unwrap();
        let a = provider.authorization_request();
        let b = provider.authorization_request();
        assert_ne!(a.state, b.state);
        assert_ne!(a.pkce_verifier, b.pkce_verifier);
    }

    #[tokio::test]
    async fn test_exchange_code_builds_bundle() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.fresh",
                "token_type": "Bearer",
                "expires_in": 3599,
                "refresh_token": "1//refresh",
                "scope": "https://www.googleapis.com/auth/drive https://www.googleapis.com/auth/documents"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = GoogleProvider::new(&config(&mock_server.uri())).unwrap();
        let bundle = provider.exchange_code("auth-code", "verifier").await.unwrap();

        assert_eq!(bundle.access_token, "ya29.fresh");
        assert_eq!(bundle.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(bundle.client_id, "client-123");
        assert_eq!(bundle.token_endpoint.as_str(), format!("{}/token", mock_server.uri()));
        assert_eq!(bundle.granted_scopes.len(), 2);
        assert!(bundle.expiry > now_secs() + 3500);
    }

    #[tokio::test]
    async fn test_rejected_code_is_exchange_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Bad Request"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = GoogleProvider::new(&config(&mock_server.uri())).unwrap();
        let err = provider.exchange_code("used-code", "verifier").await.unwrap_err();
        assert!(matches!(err, AuthError::ExchangeFailed(_)));
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token_when_not_rotated() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.refreshed",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = GoogleProvider::new(&config(&mock_server.uri())).unwrap();
        let mut old = sample_bundle(now_secs() - 10);
        old.token_endpoint = Url::parse(&format!("{}/token", mock_server.uri())).unwrap();

        let new = provider.refresh(&old).await.unwrap();
        assert_eq!(new.access_token, "ya29.refreshed");
        assert_eq!(new.refresh_token, old.refresh_token);
        assert_eq!(new.granted_scopes, old.granted_scopes);
        assert_eq!(new.client_secret, old.client_secret);
        assert!(!new.access_token_expired(now_secs()));
    }

    #[tokio::test]
    async fn test_revoked_grant_is_refresh_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Token has been expired or revoked."
            })))
            .mount(&mock_server)
            .await;

        let provider = GoogleProvider::new(&config(&mock_server.uri())).unwrap();
        let mut old = sample_bundle(now_secs() - 10);
        old.token_endpoint = Url::parse(&format!("{}/token", mock_server.uri())).unwrap();

        let err = provider.refresh(&old).await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshRejected(_)));
    }

    #[tokio::test]
    async fn test_unreachable_token_endpoint_is_network_fault() {
        let provider = GoogleProvider::new(&config("http://127.0.0.1:9")).unwrap();
        let mut old = sample_bundle(now_secs() - 10);
        old.token_endpoint = Url::parse("http://127.0.0.1:9/token").unwrap();

        let err = provider.refresh(&old).await.unwrap_err();
        assert!(matches!(err, AuthError::NetworkFault(_)));
    }
}
