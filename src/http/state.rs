//! Shared handler state and the per-request auth guard.

use std::sync::Arc;

use axum::http::HeaderMap;

use super::errors::{ApiError, ApiResult};
use crate::auth::{extract_token, resolve, Operation, Principal, Role, RoleAuthorizer, TokenVerifier};
use crate::observability::RequestMetrics;
use crate::query::PagedQueryRouter;

/// State shared by every handler
#[derive(Debug)]
pub struct AppState {
    pub verifier: TokenVerifier,
    pub authorizer: RoleAuthorizer,
    pub router: PagedQueryRouter,
    pub metrics: RequestMetrics,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(verifier: TokenVerifier, router: PagedQueryRouter) -> Self {
        Self {
            verifier,
            authorizer: RoleAuthorizer::new(),
            router,
            metrics: RequestMetrics::new(),
        }
    }

    /// Resolve the caller and check `operation` against their role.
    ///
    /// A rejected token degrades to anonymous. When anonymous is not enough,
    /// the rejection reason (or "authentication required") is a 401; a
    /// verified role lacking the permission is a 403.
    pub fn authorize(&self, headers: &HeaderMap, operation: Operation) -> ApiResult<Principal> {
        let resolved = resolve(&self.verifier, extract_token(headers));
        if resolved.rejection.is_some() {
            self.metrics.increment_token_rejections();
        }

        let role = resolved.principal.role;
        if self.authorizer.authorize(role, operation) {
            return Ok(resolved.principal);
        }

        self.metrics.increment_access_denied();
        Err(match resolved.rejection {
            Some(rejection) => ApiError::Auth(rejection),
            None if role == Role::Anonymous => ApiError::AuthenticationRequired(operation),
            None => ApiError::Forbidden { operation, role },
        })
    }
}
