use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

/// Lifetime of a session token in seconds
pub const SESSION_TTL_SECS: u64 = 3600;

/// Access tokens this close to expiry are treated as expired
const EXPIRY_SKEW_SECS: u64 = 60;

/// Delegated credentials obtained from the identity provider.
///
/// Carries everything needed to call the resource API and to refresh the
/// access token without any server-side lookup.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialBundle {
    pub access_token: String,

    /// Absent when the provider did not grant offline access
    pub refresh_token: Option<String>,

    /// Where refresh requests for this bundle are sent
    pub token_endpoint: Url,

    pub client_id: String,
    pub client_secret: String,

    #[serde(default)]
    pub granted_scopes: BTreeSet<String>,

    /// Access token expiry (Unix timestamp)
    pub expiry: u64,
}

impl CredentialBundle {
    pub fn access_token_expired(&self, now: u64) -> bool {
        self.expiry <= now + EXPIRY_SKEW_SECS
    }
}

/// Claims carried inside a signed session token
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub cred: CredentialBundle,
    pub iat: u64,
    pub exp: u64,
}

/// Current Unix time in seconds
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
pub(crate) fn sample_bundle(expiry: u64) -> CredentialBundle {
    CredentialBundle {
        access_token: "ya29.access".to_string(),
        refresh_token: Some("1//refresh".to_string()),
        token_endpoint: Url::parse("https://oauth2.googleapis.com/token").unwrap(),
        client_id: "client-123.apps.googleusercontent.com".to_string(),
        client_secret: "shh".to_string(),
        granted_scopes: ["https://www.googleapis.com/auth/drive".to_string()]
            .into_iter()
            .collect(),
        expiry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_expiry_includes_skew() {
        let now = 1_700_000_000;
        assert!(sample_bundle(now - 1).access_token_expired(now));
        assert!(sample_bundle(now + 30).access_token_expired(now));
        assert!(!sample_bundle(now + 3600).access_token_expired(now));
    }

    #[test]
    fn test_bundle_rejects_malformed_token_endpoint() {
        let json = r#"{
            "access_token": "a",
            "refresh_token": null,
            "token_endpoint": "not a url",
            "client_id": "id",
            "client_secret": "secret",
            "expiry": 1
        }"#;
        assert!(serde_json::from_str::<CredentialBundle>(json).is_err());
    }
}
