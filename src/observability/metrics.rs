//! Request counters for the HTTP surface.
//!
//! - Counters only, monotonic, reset on process start
//! - Relaxed atomics; exact totals are not needed

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Registry of request outcome counters
#[derive(Debug, Default)]
pub struct RequestMetrics {
    /// Requests that reached a handler
    requests: AtomicU64,
    /// Tokens presented but rejected by verification
    token_rejections: AtomicU64,
    /// Operations refused by the role table
    access_denied: AtomicU64,
    /// Requests rejected as invalid input
    validation_failures: AtomicU64,
    /// Requests that failed with a 5xx
    server_errors: AtomicU64,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_token_rejections(&self) {
        self.token_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_access_denied(&self) {
        self.access_denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_validation_failures(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_server_errors(&self) {
        self.server_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RequestMetricsSnapshot {
        RequestMetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            token_rejections: self.token_rejections.load(Ordering::Relaxed),
            access_denied: self.access_denied.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            server_errors: self.server_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestMetricsSnapshot {
    pub requests: u64,
    pub token_rejections: u64,
    pub access_denied: u64,
    pub validation_failures: u64,
    pub server_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let snapshot = RequestMetrics::new().snapshot();
        assert_eq!(snapshot.requests, 0);
        assert_eq!(snapshot.server_errors, 0);
    }

    #[test]
    fn test_increments() {
        let metrics = RequestMetrics::new();
        metrics.increment_requests();
        metrics.increment_requests();
        metrics.increment_access_denied();
        metrics.increment_token_rejections();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests, 2);
        assert_eq!(snapshot.access_denied, 1);
        assert_eq!(snapshot.token_rejections, 1);
        assert_eq!(snapshot.validation_failures, 0);
    }
}
