//! Signed, time-bounded session tokens.
//!
//! A session token is an HS256 JWT whose claims embed the user's
//! [`CredentialBundle`]. The server keeps no session store: whoever holds a
//! token that verifies under the process secret holds the session.

use axum_extra::extract::cookie::Key;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use sha2::{Digest, Sha512};

use crate::error::AuthError;
use crate::session::{now_secs, CredentialBundle, SessionClaims, SESSION_TTL_SECS};

const GENERATED_SECRET_LEN: usize = 64;
const COOKIE_KEY_CONTEXT: &[u8] = b"drive-relay cookie key\0";

pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    cookie_key: Key,
}

impl SessionCodec {
    pub fn new(secret: &[u8]) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::ConfigError("session secret must not be empty".to_string()));
        }
        Ok(Self::from_secret(secret))
    }

    /// Codec with a random secret that lives only as long as this process
    pub fn generate() -> Self {
        let mut secret = [0u8; GENERATED_SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::from_secret(&secret)
    }

    fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        let mut hasher = Sha512::new();
        hasher.update(COOKIE_KEY_CONTEXT);
        hasher.update(secret);
        let cookie_key = Key::from(hasher.finalize().as_slice());

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            cookie_key,
        }
    }

    /// Key for the encrypted cookie jar, derived from the signing secret
    pub fn cookie_key(&self) -> Key {
        self.cookie_key.clone()
    }

    pub fn encode(&self, bundle: &CredentialBundle) -> Result<String, AuthError> {
        self.encode_at(bundle, now_secs())
    }

    pub fn encode_at(&self, bundle: &CredentialBundle, issued_at: u64) -> Result<String, AuthError> {
        let claims = SessionClaims {
            cred: bundle.clone(),
            iat: issued_at,
            exp: issued_at + SESSION_TTL_SECS,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    pub fn decode(&self, token: &str) -> Result<CredentialBundle, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredSession,
                _ => AuthError::InvalidSession,
            },
        )?;

        let claims = data.claims;
        if claims.exp.checked_sub(claims.iat) != Some(SESSION_TTL_SECS) {
            return Err(AuthError::InvalidSession);
        }
        Ok(claims.cred)
    }
}
