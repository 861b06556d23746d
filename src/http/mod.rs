//! # HTTP Transport
//!
//! Axum surface over the query router. Owns status-code mapping, the
//! response envelope and `Cache-Control` headers; the in-process cache
//! lives in the core.
//!
//! | Status | Meaning |
//! |---|---|
//! | 400 | invalid parameter or body, validation failure |
//! | 401 | token rejected or authentication required |
//! | 403 | verified role lacks the permission |
//! | 404 | exam does not exist |
//! | 503 | data collection or both search strategies failed |

mod config;
mod errors;
mod response;
mod routes;
mod server;
mod state;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult};
pub use response::{ApiResponse, CachePolicy};
pub use routes::{exam_routes, health_routes};
pub use server::{HttpServer, REQUEST_ID_HEADER};
pub use state::{AppState, SharedState};
