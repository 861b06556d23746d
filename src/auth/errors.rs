//! # Auth Errors
//!
//! Error types for token verification.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Token verification failures
///
/// Every variant is recovered into an anonymous principal by the transport
/// layer; the code is kept so callers can tell a bad token from no token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Token could not be parsed as a signed JWT
    #[error("Malformed token")]
    Malformed,

    /// Signature did not verify against the configured secret
    #[error("Invalid token signature")]
    BadSignature,

    /// Expiry claim is in the past
    #[error("Token expired")]
    Expired,

    /// Issuer claim differs from the expected issuer
    #[error("Token issuer mismatch: expected {expected}, got {actual}")]
    IssuerMismatch { expected: String, actual: String },

    /// No role claim present
    #[error("Token missing role claim")]
    MissingRole,
}

impl AuthError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Malformed => "AUTH_MALFORMED_TOKEN",
            AuthError::BadSignature => "AUTH_BAD_SIGNATURE",
            AuthError::Expired => "AUTH_TOKEN_EXPIRED",
            AuthError::IssuerMismatch { .. } => "AUTH_ISSUER_MISMATCH",
            AuthError::MissingRole => "AUTH_MISSING_ROLE",
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        401
    }
}
