//! Service-account authentication against the Google OAuth2 token endpoint.
//!
//! A signed RS256 JWT is exchanged for a short-lived bearer token, which is
//! cached until shortly before expiry. The key bundle is loaded once at
//! startup; its absence is a configuration error, not a panic.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Scopes covering spreadsheet reads/appends and Drive uploads.
const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Refresh the cached token this many seconds before it expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The fields of a Google service-account JSON key this service uses.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    token: String,
    expires_at: i64,
}

/// Issues and caches bearer tokens for the Google APIs.
pub struct TokenProvider {
    http: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenProvider {
    /// Load the service-account key from `path` and prepare the signing key.
    pub fn from_key_file(path: &str) -> Result<Self, AuthError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AuthError::Config(format!("cannot read service account key at {path}: {e}"))
        })?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| AuthError::Config(format!("malformed service account key: {e}")))?;
        Self::from_key(key)
    }

    pub fn from_key(key: ServiceAccountKey) -> Result<Self, AuthError> {
        let encoding_key =
            EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(AuthError::Jwt)?;
        Ok(Self {
            http: reqwest::Client::new(),
            key,
            encoding_key,
            cached: RwLock::new(None),
        })
    }

    /// A bearer token valid for at least [`EXPIRY_MARGIN_SECS`] more seconds.
    pub async fn bearer_token(&self) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();

        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.exchange_jwt(now).await?;
        let token = fresh.token.clone();
        *self.cached.write().await = Some(fresh);
        Ok(token)
    }

    async fn exchange_jwt(&self, now: i64) -> Result<CachedToken, AuthError> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(AuthError::Jwt)?;

        tracing::debug!(issuer = %self.key.client_email, "exchanging service-account JWT");

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .map_err(AuthError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected(format!("{status}: {body}")));
        }

        let body: TokenResponse = response.json().await.map_err(AuthError::Http)?;
        Ok(CachedToken {
            token: body.access_token,
            expires_at: now + body.expires_in,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("credential configuration error: {0}")]
    Config(String),

    #[error("failed to sign service-account assertion: {0}")]
    Jwt(#[source] jsonwebtoken::errors::Error),

    #[error("token request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("token endpoint rejected request: {0}")]
    Rejected(String),
}
