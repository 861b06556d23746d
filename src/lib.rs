//! examcal - exam calendar REST backend
//!
//! Token verification and role authorization in front of a paged,
//! tier-cached query layer over exam records.

pub mod auth;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod http;
pub mod observability;
pub mod query;
pub mod search;
pub mod store;
