//! # Roles and Permissions
//!
//! Maps a verified role to the set of operations it may perform.
//!
//! The matrix lives in one static table per role so it can be audited
//! and tested without touching request handling.

use std::fmt;

use serde::Serialize;

/// Role derived from a token's `role` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Anonymous,
    Authenticated,
    Service,
    /// Any role string we do not recognise; holds no permissions
    Unknown,
}

impl Role {
    /// Parse a role claim. Accepts the issuer's spellings (`anon`,
    /// `service_role`) as well as the plain names.
    pub fn from_claim(claim: &str) -> Self {
        match claim {
            "anon" | "anonymous" => Role::Anonymous,
            "authenticated" => Role::Authenticated,
            "service_role" | "service" => Role::Service,
            other => {
                tracing::warn!(role = other, "unrecognised role claim");
                Role::Unknown
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Anonymous => "anonymous",
            Role::Authenticated => "authenticated",
            Role::Service => "service",
            Role::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations exposed by the exam API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ReadList,
    ReadOne,
    Search,
    BrowseReference,
    Create,
    Update,
    Delete,
    /// Cache statistics and other operator views
    Inspect,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::ReadList,
        Operation::ReadOne,
        Operation::Search,
        Operation::BrowseReference,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::Inspect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ReadList => "read_list",
            Operation::ReadOne => "read_one",
            Operation::Search => "search",
            Operation::BrowseReference => "browse_reference",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Inspect => "inspect",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const READ_OPERATIONS: [Operation; 4] = [
    Operation::ReadList,
    Operation::ReadOne,
    Operation::Search,
    Operation::BrowseReference,
];

static ANONYMOUS_PERMISSIONS: &[Operation] = &READ_OPERATIONS;

static AUTHENTICATED_PERMISSIONS: &[Operation] = &[
    Operation::ReadList,
    Operation::ReadOne,
    Operation::Search,
    Operation::BrowseReference,
    Operation::Create,
    Operation::Update,
];

static SERVICE_PERMISSIONS: &[Operation] = &Operation::ALL;

static NO_PERMISSIONS: &[Operation] = &[];

/// Stateless role-to-permission authorizer
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleAuthorizer;

impl RoleAuthorizer {
    pub fn new() -> Self {
        Self
    }

    /// Permission set granted to `role`
    pub fn permissions(role: Role) -> &'static [Operation] {
        match role {
            Role::Anonymous => ANONYMOUS_PERMISSIONS,
            Role::Authenticated => AUTHENTICATED_PERMISSIONS,
            Role::Service => SERVICE_PERMISSIONS,
            Role::Unknown => NO_PERMISSIONS,
        }
    }

    /// Whether `role` may perform `operation`
    pub fn authorize(&self, role: Role, operation: Operation) -> bool {
        let allowed = Self::permissions(role).contains(&operation);
        if !allowed {
            tracing::debug!(%role, %operation, "operation denied");
        }
        allowed
    }
}
