//! CLI module for examcal
//!
//! Provides command-line interface for:
//! - serve: Load configuration and run the HTTP API
//! - verify-token: Check a token offline and print its principal

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_state, run, run_command, serve, verify_token};
pub use errors::{CliError, CliErrorCode, CliResult};
