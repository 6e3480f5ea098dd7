//! Access- and refresh-token issuance and verification.
//!
//! Both token kinds are HS256-signed JWTs, each with its own secret so a token
//! of one kind can never verify as the other. Refresh tokens additionally carry
//! `typ = "refresh"` and a unique `jti`, so two refresh tokens issued to the
//! same user in the same second still differ (and hash differently).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use resumate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthError;

/// Value of [`RefreshClaims::typ`] on every refresh token.
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 30;

/// Claims embedded in every access token. Verified per request, never stored.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// The user's role name (e.g. `"admin"`, `"user"`).
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier.
    pub jti: String,
}

/// Claims embedded in every refresh token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: DbId,
    /// Token kind marker; always [`REFRESH_TOKEN_TYPE`].
    pub typ: String,
    pub exp: i64,
    pub iat: i64,
    /// Unique per issuance.
    pub jti: String,
}

/// A freshly minted refresh token and the instant it stops verifying.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Signing secrets and lifetimes for both token kinds.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret for access tokens.
    pub access_secret: String,
    /// HMAC-SHA256 secret for refresh tokens. Must differ from `access_secret`.
    pub refresh_secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 30).
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_ACCESS_SECRET`        | **yes**  | --      |
    /// | `JWT_REFRESH_SECRET`       | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `15`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if either secret is missing or empty, or if both secrets are equal.
    pub fn from_env() -> Self {
        let access_secret = std::env::var("JWT_ACCESS_SECRET")
            .expect("JWT_ACCESS_SECRET must be set in the environment");
        let refresh_secret = std::env::var("JWT_REFRESH_SECRET")
            .expect("JWT_REFRESH_SECRET must be set in the environment");
        assert!(!access_secret.is_empty(), "JWT_ACCESS_SECRET must not be empty");
        assert!(!refresh_secret.is_empty(), "JWT_REFRESH_SECRET must not be empty");
        assert_ne!(
            access_secret, refresh_secret,
            "JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ"
        );

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("JWT_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_DAYS must be a valid i64");

        Self {
            access_secret,
            refresh_secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        }
    }
}

/// Mints and verifies access and refresh tokens. Pure: no I/O, no shared state
/// beyond the injected [`JwtConfig`].
#[derive(Debug, Clone)]
pub struct TokenService {
    config: JwtConfig,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.config.access_token_expiry_mins * 60
    }

    /// Refresh token (and session row) lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::days(self.config.refresh_token_expiry_days)
    }

    /// Generate an access token for the given user and role.
    pub fn issue_access_token(
        &self,
        user_id: DbId,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: user_id,
            role: role.to_string(),
            exp: now + self.access_ttl_secs(),
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(), // HS256
            &claims,
            &EncodingKey::from_secret(self.config.access_secret.as_bytes()),
        )
    }

    /// Generate a refresh token for the given user.
    pub fn issue_refresh_token(
        &self,
        user_id: DbId,
    ) -> Result<IssuedRefreshToken, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let expires_at = now + self.refresh_ttl();
        let claims = RefreshClaims {
            sub: user_id,
            typ: REFRESH_TOKEN_TYPE.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.refresh_secret.as_bytes()),
        )?;
        Ok(IssuedRefreshToken { token, expires_at })
    }

    /// Validate an access token's signature and expiry.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.config.access_secret.as_bytes()),
            &strict_validation(),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
    }

    /// Validate a refresh token's signature, expiry, and kind marker.
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        let claims = decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.config.refresh_secret.as_bytes()),
            &strict_validation(),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)?;

        if claims.typ != REFRESH_TOKEN_TYPE {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}

/// HS256 with `exp` checked and no clock leeway. Session rows expire at the
/// token's `exp`, so a token must stop verifying at that same instant.
fn strict_validation() -> Validation {
    let mut validation = Validation::default();
    validation.leeway = 0;
    validation
}
