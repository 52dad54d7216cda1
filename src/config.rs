//! Configuration management for Vidmatch Server

use std::env;
use std::str::FromStr;

use crate::media::{DEFAULT_CHUNK_SIZE, DEFAULT_FETCH_TIMEOUT_SECS};
use crate::session::SESSION_TTL_HOURS;

/// Default request body limit: 64MB
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub fetch: FetchConfig,
    pub sessions: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body; bigger payloads must be split in two
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Items fetched concurrently per chunk
    pub chunk_size: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl_hours: i64,
    pub cleanup_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            },
            fetch: FetchConfig {
                chunk_size: DEFAULT_CHUNK_SIZE,
                timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
                user_agent: format!("vidmatch-server/{}", env!("CARGO_PKG_VERSION")),
            },
            sessions: SessionConfig {
                ttl_hours: SESSION_TTL_HOURS,
                cleanup_interval_secs: 300,
            },
        }
    }
}

impl Config {
    /// Read configuration from the environment
    ///
    /// Unset variables keep their defaults; set but unparsable ones are an
    /// error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let config = Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
                max_body_bytes: parse_var("MAX_BODY_BYTES", defaults.server.max_body_bytes)?,
            },
            fetch: FetchConfig {
                chunk_size: parse_var("FETCH_CHUNK_SIZE", defaults.fetch.chunk_size)?.max(1),
                timeout_secs: parse_var("FETCH_TIMEOUT_SECS", defaults.fetch.timeout_secs)?,
                user_agent: env::var("FETCH_USER_AGENT").unwrap_or(defaults.fetch.user_agent),
            },
            sessions: SessionConfig {
                ttl_hours: parse_var("SESSION_TTL_HOURS", defaults.sessions.ttl_hours)?,
                cleanup_interval_secs: parse_var(
                    "SESSION_CLEANUP_INTERVAL_SECS",
                    defaults.sessions.cleanup_interval_secs,
                )?,
            },
        };

        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.fetch.chunk_size, 8);
        assert_eq!(config.fetch.timeout_secs, 60);
        assert_eq!(config.sessions.ttl_hours, 24);
        assert!(config.fetch.user_agent.starts_with("vidmatch-server/"));
    }

    #[test]
    fn test_parse_var_fallback() {
        assert_eq!(parse_var("VIDMATCH_TEST_UNSET_VAR", 42u16).unwrap(), 42);
    }

    #[test]
    fn test_parse_var_invalid() {
        env::set_var("VIDMATCH_TEST_BAD_PORT", "eighty");
        let result = parse_var("VIDMATCH_TEST_BAD_PORT", 8080u16);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        env::remove_var("VIDMATCH_TEST_BAD_PORT");
    }
}
