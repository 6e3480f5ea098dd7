//! Authentication primitives and the refresh-token session protocol.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access/refresh token issuance and verification.
//! - [`rotation`] -- session start, refresh rotation with reuse detection, logout.
//! - [`cookies`] -- the refresh-token cookie transport.

pub mod cookies;
pub mod jwt;
pub mod password;
pub mod rotation;

/// Reasons a presented token is refused. Every variant requires the client
/// to authenticate again; none is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Malformed, expired, wrongly signed, or wrong token kind.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Valid signature, but the lineage was already rotated away.
    #[error("Refresh token reuse detected. All sessions revoked.")]
    RefreshReuseDetected,

    /// The request did not carry a token at all.
    #[error("Missing refresh token")]
    MissingToken,
}

impl AuthError {
    /// Machine-readable code placed in the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::RefreshReuseDetected => "REFRESH_REUSE_DETECTED",
            AuthError::MissingToken => "MISSING_TOKEN",
        }
    }
}
