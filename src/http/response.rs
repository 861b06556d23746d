//! # Response Envelope
//!
//! Every endpoint answers with [`ApiResponse`]; successful reads also carry
//! a `Cache-Control` header chosen by [`CachePolicy`].

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::Page;

/// Standard response body
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            timestamp: Utc::now(),
            count: None,
            page: None,
            total_pages: None,
            error_code: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// Full list with its length as `count`
    pub fn list(items: Vec<T>, message: impl Into<String>) -> Self {
        let count = items.len();
        Self::ok(items, message).with_count(count)
    }
}

impl<T: Serialize> ApiResponse<Page<T>> {
    /// One page, with page metadata lifted into the envelope
    pub fn paged(page: Page<T>, message: impl Into<String>) -> Self {
        let (count, index, total_pages) = (page.items.len(), page.page, page.total_pages);
        let mut response = Self::ok(page, message).with_count(count);
        response.page = Some(index);
        response.total_pages = Some(total_pages);
        response
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>, code: &str) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            timestamp: Utc::now(),
            count: None,
            page: None,
            total_pages: None,
            error_code: Some(code.to_string()),
        }
    }
}

/// HTTP caching hints for clients and proxies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// General listings and search
    Listing,
    /// Per-degree and per-subject listings
    Filtered,
    /// Reference values and statistics
    Reference,
    /// Single exam
    Entity,
    NoStore,
}

impl CachePolicy {
    pub fn header_value(&self) -> &'static str {
        match self {
            CachePolicy::Listing => "public, max-age=300, must-revalidate",
            CachePolicy::Filtered => "public, max-age=600",
            CachePolicy::Reference => "public, max-age=1800",
            CachePolicy::Entity => "public, max-age=1800",
            CachePolicy::NoStore => "no-store",
        }
    }
}

/// Serialize `body` with the given status and cache policy
pub fn respond<T: Serialize>(
    status: StatusCode,
    policy: CachePolicy,
    body: ApiResponse<T>,
) -> Response {
    (
        status,
        [(header::CACHE_CONTROL, policy.header_value())],
        Json(body),
    )
        .into_response()
}

/// 200 with the given cache policy
pub fn ok<T: Serialize>(policy: CachePolicy, body: ApiResponse<T>) -> Response {
    respond(StatusCode::OK, policy, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PageRequest;

    #[test]
    fn test_paged_envelope() {
        let page = Page::from_ordered(vec![1, 2, 3], &PageRequest::new(1, 2));
        let response = ApiResponse::paged(page, "ok");
        assert_eq!(response.count, Some(1));
        assert_eq!(response.page, Some(1));
        assert_eq!(response.total_pages, Some(2));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("error_code").is_none());
    }

    #[test]
    fn test_error_envelope() {
        let json = serde_json::to_value(ApiResponse::error("nope", "NOT_FOUND")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_code"], "NOT_FOUND");
        assert!(json["data"].is_null());
    }

    #[test]
    fn test_policies() {
        assert_eq!(
            CachePolicy::Listing.header_value(),
            "public, max-age=300, must-revalidate"
        );
        assert_eq!(CachePolicy::Reference.header_value(), "public, max-age=1800");
    }
}
