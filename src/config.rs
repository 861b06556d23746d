//! # Service Configuration
//!
//! JSON file with per-section defaults, then environment overrides:
//!
//! | Variable | Overrides |
//! |---|---|
//! | `EXAMCAL_JWT_SECRET` | `auth.jwt_secret` |
//! | `EXAMCAL_PROJECT_URL` | `auth.project_url` |
//! | `EXAMCAL_PORT` | `http.port` |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::JwtConfig;
use crate::cache::CacheConfig;
use crate::http::HttpServerConfig;

pub const ENV_JWT_SECRET: &str = "EXAMCAL_JWT_SECRET";
pub const ENV_PROJECT_URL: &str = "EXAMCAL_PROJECT_URL";
pub const ENV_PORT: &str = "EXAMCAL_PORT";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Invalid config: {0}")]
    Parse(String),

    #[error("JWT secret is not configured (set auth.jwt_secret or EXAMCAL_JWT_SECRET)")]
    MissingSecret,

    #[error("JWT secret is not valid base64")]
    InvalidSecret,

    #[error("Invalid value for {name}: {value}")]
    InvalidOverride { name: &'static str, value: String },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "CONFIG_IO_ERROR",
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR",
            ConfigError::MissingSecret => "CONFIG_MISSING_SECRET",
            ConfigError::InvalidSecret => "CONFIG_INVALID_SECRET",
            ConfigError::InvalidOverride { .. } => "CONFIG_INVALID_OVERRIDE",
        }
    }
}

/// Token verification settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthSettings {
    /// HMAC secret shared with the token issuer
    #[serde(default)]
    pub jwt_secret: Option<String>,

    #[serde(default)]
    pub secret_is_base64: bool,

    /// Auth project URL; the expected issuer is `<project_url>/auth/v1`
    #[serde(default)]
    pub project_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSettings {
    /// JSON array of exams loaded at startup
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Whole-service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub data: DataSettings,

    /// Used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            auth: AuthSettings::default(),
            cache: CacheConfig::default(),
            data: DataSettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl ServiceConfig {
    /// Read the file, apply process environment overrides and validate
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply overrides from `lookup` (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(ENV_JWT_SECRET).filter(|s| !s.trim().is_empty()) {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(url) = lookup(ENV_PROJECT_URL) {
            self.auth.project_url = Some(url);
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.http.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride {
                    name: ENV_PORT,
                    value: port.clone(),
                })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.jwt_config().map(|_| ())
    }

    /// Verifier settings; fails when the secret is absent or undecodable
    pub fn jwt_config(&self) -> ConfigResult<JwtConfig> {
        let secret = self
            .auth
            .jwt_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let mut config = JwtConfig::new(secret);
        if self.auth.secret_is_base64 {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(secret.trim())
                .map_err(|_| ConfigError::InvalidSecret)?;
            config = config.with_base64_secret();
        }
        if let Some(url) = self.auth.project_url.as_deref() {
            config = config.with_project_url(url);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = ServiceConfig::from_json("{}").unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cache, CacheConfig::default());
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_missing_secret_rejected() {
        let config = ServiceConfig::from_json("{}").unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), "CONFIG_MISSING_SECRET");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServiceConfig::from_json(r#"{"auth": {"jwt_secret": "file"}}"#).unwrap();
        config
            .apply_overrides(env(&[
                (ENV_JWT_SECRET, "env-secret"),
                (ENV_PROJECT_URL, "https://demo.example.co/"),
                (ENV_PORT, "9090"),
            ]))
            .unwrap();

        assert_eq!(config.auth.jwt_secret.as_deref(), Some("env-secret"));
        assert_eq!(config.http.port, 9090);
        let jwt = config.jwt_config().unwrap();
        assert_eq!(
            jwt.expected_issuer.as_deref(),
            Some("https://demo.example.co/auth/v1")
        );
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = ServiceConfig::default();
        let err = config
            .apply_overrides(env(&[(ENV_PORT, "eighty")]))
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG_INVALID_OVERRIDE");
    }

    #[test]
    fn test_invalid_base64_secret() {
        let config = ServiceConfig::from_json(
            r#"{"auth": {"jwt_secret": "not base64!!", "secret_is_base64": true}}"#,
        )
        .unwrap();
        assert_eq!(config.validate().unwrap_err().code(), "CONFIG_INVALID_SECRET");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examcal.json");
        std::fs::write(
            &path,
            r#"{"auth": {"jwt_secret": "s3cret"}, "cache": {"long": {"capacity": 5, "ttl_secs": 60}}}"#,
        )
        .unwrap();

        let config = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(config.cache.long.capacity, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = ServiceConfig::from_file(Path::new("/nonexistent/examcal.json")).unwrap_err();
        assert_eq!(err.code(), "CONFIG_IO_ERROR");
    }
}
