//! # Auth Module
//!
//! Stateless bearer-token verification and role-based authorization.
//!
//! Tokens are issued elsewhere; this module only verifies them, derives a
//! request-scoped [`Principal`] and checks operations against a static
//! role-to-permission table.

pub mod errors;
pub mod extract;
pub mod jwt;
pub mod principal;
pub mod roles;

pub use errors::{AuthError, AuthResult};
pub use extract::extract_token;
pub use jwt::{Claims, JwtConfig, TokenClaims, TokenVerifier};
pub use principal::{resolve, Principal, Resolved};
pub use roles::{Operation, Role, RoleAuthorizer};
