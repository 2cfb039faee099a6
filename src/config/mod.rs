//! Configuration module for the matching backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key the identity front-end presents (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Upper bound for a whole request, store calls included
    pub request_timeout: Duration,
}

/// Configuration value that could not be parsed.
#[derive(Debug)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid value {:?} for {}", self.value, self.key)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("MATCH_API_PSK").ok().filter(|s| !s.is_empty());

        let db_path = env::var("MATCH_DB_PATH")
            .unwrap_or_else(|_| "./data/match.sqlite".to_string())
            .into();

        let raw_addr = env::var("MATCH_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = raw_addr.parse().map_err(|_| ConfigError {
            key: "MATCH_BIND_ADDR",
            value: raw_addr.clone(),
        })?;

        let log_level = env::var("MATCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let raw_format = env::var("MATCH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
        let log_json = match raw_format.as_str() {
            "text" => false,
            "json" => true,
            _ => {
                return Err(ConfigError {
                    key: "MATCH_LOG_FORMAT",
                    value: raw_format,
                })
            }
        };

        let raw_timeout =
            env::var("MATCH_REQUEST_TIMEOUT_SECS").unwrap_or_else(|_| "10".to_string());
        let timeout_secs: u64 = raw_timeout
            .parse()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError {
                key: "MATCH_REQUEST_TIMEOUT_SECS",
                value: raw_timeout.clone(),
            })?;

        Ok(Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            log_json,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
