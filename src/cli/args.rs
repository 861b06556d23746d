//! CLI argument definitions using clap
//!
//! Commands:
//! - examcal serve --config <path> [--port <port>]
//! - examcal verify-token --config <path> <token>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// examcal - exam calendar API with token auth and tiered query caching
#[derive(Parser, Debug)]
#[command(name = "examcal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./examcal.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Verify a bearer token and print the derived principal
    VerifyToken {
        /// Path to configuration file
        #[arg(long, default_value = "./examcal.json")]
        config: PathBuf,

        /// Raw token (without the "Bearer " prefix)
        token: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["examcal", "serve", "--port", "9000"]);
        match cli.command {
            Command::Serve { config, port } => {
                assert_eq!(config, PathBuf::from("./examcal.json"));
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_verify_token() {
        let cli = Cli::parse_from(["examcal", "verify-token", "--config", "/etc/examcal.json", "abc"]);
        match cli.command {
            Command::VerifyToken { config, token } => {
                assert_eq!(config, PathBuf::from("/etc/examcal.json"));
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
