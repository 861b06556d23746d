//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::auth::{Principal, TokenVerifier};
use crate::cache::QueryCache;
use crate::config::ServiceConfig;
use crate::http::{AppState, HttpServer};
use crate::observability::init_tracing;
use crate::query::PagedQueryRouter;
use crate::store::{ExamStore, InMemoryExamStore};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::VerifyToken { config, token } => verify_token(&config, &token),
    }
}

fn verifier(config: &ServiceConfig) -> CliResult<TokenVerifier> {
    let jwt = config.jwt_config()?;
    TokenVerifier::new(&jwt).ok_or_else(|| CliError::config_error("JWT secret is not valid base64"))
}

/// Wire store, cache, router and verifier from configuration
pub fn build_state(config: &ServiceConfig) -> CliResult<AppState> {
    let verifier = verifier(config)?;

    let store: Arc<dyn ExamStore> = match &config.data.seed_file {
        Some(path) => Arc::new(InMemoryExamStore::from_seed_file(path)?),
        None => {
            tracing::warn!("no seed file configured, starting with an empty exam store");
            Arc::new(InMemoryExamStore::new())
        }
    };

    let cache = Arc::new(QueryCache::new(&config.cache));
    let router = PagedQueryRouter::new(store, cache);
    Ok(AppState::new(verifier, router))
}

/// Load configuration, then run the HTTP API until it stops
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = ServiceConfig::load(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }
    init_tracing(&config.log_level);
    tracing::info!(config = %config_path.display(), "configuration loaded");

    let state = Arc::new(build_state(&config)?);
    let server = HttpServer::new(config.http.clone(), state);

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to start runtime: {}", e)))?;
    runtime
        .block_on(server.start())
        .map_err(|e| CliError::boot_failed(e.to_string()))
}

/// Verify one token and print the principal it maps to
pub fn verify_token(config_path: &Path, token: &str) -> CliResult<()> {
    let config = ServiceConfig::load(config_path)?;
    let verifier = verifier(&config)?;

    match verifier.verify(token.trim()) {
        Ok(claims) => write_response(json!({ "principal": Principal::from_claims(claims) })),
        Err(err) => {
            write_error(err.code(), &err.to_string())?;
            Err(CliError::token_rejected(err.code()))
        }
    }
}
