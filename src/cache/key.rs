//! # Cache Keys
//!
//! A key is the operation name plus its normalized parameters, rendered as
//! `operation?name=value&name=value` with parameters in name order. Absent
//! and blank parameters are dropped so `null` and "not given" collapse.

use std::collections::BTreeMap;
use std::fmt;

use crate::store::PageRequest;

/// Deterministic cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn builder(operation: &str) -> CacheKeyBuilder {
        CacheKeyBuilder {
            operation: operation.to_string(),
            params: BTreeMap::new(),
        }
    }

    /// Key with no parameters
    pub fn of(operation: &str) -> Self {
        Self::builder(operation).build()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builder for [`CacheKey`]
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    operation: String,
    params: BTreeMap<String, String>,
}

impl CacheKeyBuilder {
    /// Optional text parameter; `None` and blank values are skipped
    pub fn param(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.params.insert(name.to_string(), value.to_string());
        }
        self
    }

    /// Parameter that is always present
    pub fn value(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn page(self, page: &PageRequest) -> Self {
        self.value("page", page.page()).value("size", page.size())
    }

    pub fn build(self) -> CacheKey {
        let mut key = escape(&self.operation);
        for (i, (name, value)) in self.params.iter().enumerate() {
            key.push(if i == 0 { '?' } else { '&' });
            key.push_str(&escape(name));
            key.push('=');
            key.push_str(&escape(value));
        }
        CacheKey(key)
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' | '&' | '=' | '?' | '#' => out.push_str(&format!("%{:02X}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}
