//! OAuth2 JWT-bearer authentication for Google service accounts.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::credentials::ServiceAccountKey;
use crate::error::AuthError;

/// Read-only Analytics scope requested for every token.
pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of the signed assertion, the maximum Google accepts.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh tokens this long before they actually expire.
const TOKEN_REFRESH_BUFFER_SECS: i64 = 30;

/// OAuth2 token response from Google.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    #[serde(default)]
    token_type: String,
    expires_in: i64,
}

/// JWT claim set for the service-account assertion.
#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Cached token with expiration tracking.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Check if token is expired (with buffer).
    fn is_expired(&self, buffer: Duration) -> bool {
        Utc::now() + buffer >= self.expires_at
    }
}

/// Token broker for a single service account.
#[derive(Clone)]
pub struct AuthClient {
    http_client: Client,
    debug: bool,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl AuthClient {
    /// Create a new auth client sharing the caller's HTTP client.
    pub fn new(http_client: Client, debug: bool) -> Self {
        Self {
            http_client,
            debug,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a valid access token for the key, refreshing if necessary.
    pub async fn get_token(&self, key: &ServiceAccountKey) -> Result<String, AuthError> {
        // Check cache first
        {
            let cache = self.token_cache.read().await;
            if let Some(ref cached) = *cache {
                if !cached.is_expired(Duration::seconds(TOKEN_REFRESH_BUFFER_SECS)) {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        self.fetch_token(key).await
    }

    /// Exchange a signed assertion for an access token at the key's endpoint.
    async fn fetch_token(&self, key: &ServiceAccountKey) -> Result<String, AuthError> {
        let assertion = sign_assertion(key)?;
        let body = format!(
            "grant_type={}&assertion={}",
            urlencoding::encode(JWT_BEARER_GRANT),
            assertion
        );

        if self.debug {
            tracing::debug!(token_uri = %key.token_uri, "fetching access token");
        }

        let response = self
            .http_client
            .post(&key.token_uri)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenRequestFailed { status, body });
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            AuthError::TokenParse(format!("Failed to parse token response: {}", e))
        })?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);

        if self.debug {
            tracing::debug!(expires_at = %expires_at, "access token acquired");
        }

        let cached = CachedToken {
            access_token: token_response.access_token.clone(),
            expires_at,
        };

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(cached);
        }

        Ok(token_response.access_token)
    }
}

/// Build and RS256-sign the JWT-bearer assertion for the key.
fn sign_assertion(key: &ServiceAccountKey) -> Result<String, AuthError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| AuthError::Signing(e.to_string()))?;

    let iat = Utc::now().timestamp();
    let claims = Claims {
        iss: &key.client_email,
        scope: ANALYTICS_READONLY_SCOPE,
        aud: &key.token_uri,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| AuthError::Signing(e.to_string()))
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("debug", &self.debug)
            .finish()
    }
}
