use serde::{Deserialize, Serialize};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Path the identity provider redirects back to after consent
pub const CALLBACK_PATH: &str = "/oauth2callback";

/// Authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// OAuth2 client and provider endpoints
    #[serde(default)]
    pub oauth: OAuthConfig,

    /// Session cookie configuration
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Registered OAuth client credentials
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    /// Provider authorization endpoint
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Provider token endpoint (code exchange and refresh)
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Redirect URI registered with the provider.
    /// Derived from the public base URL when not set explicitly.
    pub redirect_url: Option<String>,

    /// Scopes requested at authorization time
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Timeout for calls to the token endpoint
    #[serde(default = "default_oauth_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session cookie name
    #[serde(default = "default_session_cookie_name")]
    pub cookie_name: String,

    /// Signing secret for session tokens. Generated at startup when absent,
    /// in which case sessions do not survive a restart.
    pub secret: Option<String>,

    /// Secure cookie (HTTPS only)
    #[serde(default)]
    pub secure: bool,

    /// How long an authorization redirect may wait for its callback
    #[serde(default = "default_state_timeout")]
    pub state_timeout_seconds: u64,

    /// Upper bound on authorizations awaiting their callback; the oldest
    /// is dropped when a new one would exceed it
    #[serde(default = "default_max_pending_authorizations")]
    pub max_pending_authorizations: usize,
}

fn default_auth_url() -> String {
    GOOGLE_AUTH_URL.to_string()
}

fn default_token_url() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        "https://www.googleapis.com/auth/drive".to_string(),
        "https://www.googleapis.com/auth/documents".to_string(),
        "https://www.googleapis.com/auth/spreadsheets".to_string(),
    ]
}

fn default_oauth_timeout() -> u64 {
    10
}

fn default_session_cookie_name() -> String {
    "session_token".to_string()
}

fn default_state_timeout() -> u64 {
    600 // 10 minutes
}

fn default_max_pending_authorizations() -> usize {
    10_000
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            redirect_url: None,
            scopes: default_scopes(),
            timeout_seconds: default_oauth_timeout(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_session_cookie_name(),
            secret: None,
            secure: false,
            state_timeout_seconds: default_state_timeout(),
            max_pending_authorizations: default_max_pending_authorizations(),
        }
    }
}

impl AuthConfig {
    /// Fill in deployment-dependent settings from the public base URL.
    ///
    /// The redirect URI becomes `{base}/oauth2callback` unless one was
    /// configured, and cookies are marked secure when the base is https.
    pub fn with_public_url(mut self, public_url: &str) -> Self {
        let base = public_url.trim_end_matches('/');
        if self.oauth.redirect_url.is_none() {
            self.oauth.redirect_url = Some(format!("{}{}", base, CALLBACK_PATH));
        }
        if base.starts_with("https://") {
            self.session.secure = true;
        }
        self
    }
}
