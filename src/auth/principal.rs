//! # Principal
//!
//! Request-scoped identity derived from a verified token.
//! Never persisted; built fresh for every request.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::AuthError;
use super::jwt::{Claims, TokenVerifier};
use super::roles::Role;

/// Assurance level claim value that indicates multi-factor authentication
const MFA_ASSURANCE_LEVEL: &str = "aal2";

/// Identity carried with each request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    /// Subject ID (None when anonymous)
    pub subject_id: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub session_id: Option<String>,
    pub mfa_level: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
}

impl Principal {
    /// Principal for requests without a usable token
    pub fn anonymous() -> Self {
        Self {
            subject_id: None,
            email: None,
            role: Role::Anonymous,
            session_id: None,
            mfa_level: None,
            token_expiry: None,
        }
    }

    pub fn from_claims(claims: Claims) -> Self {
        Self {
            subject_id: Some(claims.subject),
            email: claims.email,
            role: claims.role,
            session_id: claims.session_id,
            mfa_level: claims.assurance_level,
            token_expiry: Some(claims.expires_at),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.subject_id.is_none()
    }

    pub fn has_mfa(&self) -> bool {
        self.mfa_level.as_deref() == Some(MFA_ASSURANCE_LEVEL)
    }
}

impl Default for Principal {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// Outcome of resolving a request's credentials
#[derive(Debug, Clone)]
pub struct Resolved {
    pub principal: Principal,
    /// Set when a token was presented but rejected
    pub rejection: Option<AuthError>,
}

/// Resolve an optional raw token into a principal.
///
/// Verification failures never propagate: the request continues as
/// anonymous and the rejection is kept for status mapping and logging.
pub fn resolve(verifier: &TokenVerifier, token: Option<&str>) -> Resolved {
    let Some(token) = token else {
        return Resolved {
            principal: Principal::anonymous(),
            rejection: None,
        };
    };

    match verifier.verify(token) {
        Ok(claims) => {
            let principal = Principal::from_claims(claims);
            tracing::debug!(
                subject = principal.subject_id.as_deref().unwrap_or(""),
                role = %principal.role,
                "token verified"
            );
            Resolved {
                principal,
                rejection: None,
            }
        }
        Err(err) => {
            tracing::debug!(code = err.code(), "token rejected, continuing as anonymous");
            Resolved {
                principal: Principal::anonymous(),
                rejection: Some(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::jwt::test_support::{claims, sign, TEST_SECRET};
    use crate::auth::jwt::JwtConfig;
    use crate::clock::ManualClock;

    fn verifier(now: DateTime<Utc>) -> TokenVerifier {
        TokenVerifier::with_clock(&JwtConfig::new(TEST_SECRET), Arc::new(ManualClock::new(now)))
            .unwrap()
    }

    #[test]
    fn test_no_token_is_anonymous() {
        let resolved = resolve(&verifier(Utc::now()), None);
        assert!(resolved.principal.is_anonymous());
        assert_eq!(resolved.principal.role, Role::Anonymous);
        assert!(resolved.rejection.is_none());
    }

    #[test]
    fn test_bad_token_falls_back_to_anonymous() {
        let resolved = resolve(&verifier(Utc::now()), Some("garbage"));
        assert!(resolved.principal.is_anonymous());
        assert_eq!(resolved.rejection, Some(AuthError::Malformed));
    }

    #[test]
    fn test_valid_token_builds_principal() {
        let now = Utc::now();
        let mut c = claims("u1", Some("service_role"), now.timestamp() + 60);
        c.aal = Some("aal2".to_string());
        let resolved = resolve(&verifier(now), Some(&sign(&c, TEST_SECRET)));

        assert_eq!(resolved.principal.subject_id.as_deref(), Some("u1"));
        assert_eq!(resolved.principal.role, Role::Service);
        assert!(resolved.principal.has_mfa());
        assert!(resolved.principal.token_expiry.is_some());
    }
}
