//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_ADDR: &str = "127.0.0.1:8788";
const DEFAULT_DATABASE_URL: &str = "sqlite:ops.db?mode=rwc";
const DEFAULT_DEDUPE_CAPACITY: usize = 10_000;
const DEFAULT_DEDUPE_TTL_SECS: u64 = 6 * 60 * 60;

/// Admin web server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Keys remembered by the telemetry dedupe cache.
    pub telemetry_dedupe_capacity: usize,
    /// How long a telemetry key is remembered.
    pub telemetry_dedupe_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ADMIN_ADDR` | Server bind address | `127.0.0.1:8788` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:ops.db?mode=rwc` |
    /// | `TELEMETRY_DEDUPE_CAPACITY` | Dedupe cache size | `10000` |
    /// | `TELEMETRY_DEDUPE_TTL_SECS` | Dedupe key lifetime | `21600` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup("ADMIN_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            lookup("SQLITE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let telemetry_dedupe_capacity = match lookup("TELEMETRY_DEDUPE_CAPACITY") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("TELEMETRY_DEDUPE_CAPACITY"))?,
            None => DEFAULT_DEDUPE_CAPACITY,
        };

        let ttl_secs = match lookup("TELEMETRY_DEDUPE_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("TELEMETRY_DEDUPE_TTL_SECS"))?,
            None => DEFAULT_DEDUPE_TTL_SECS,
        };

        Ok(Self {
            addr,
            database_url,
            telemetry_dedupe_capacity,
            telemetry_dedupe_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ADMIN_ADDR format")]
    InvalidAddr,

    #[error("{0} must be a non-negative integer")]
    InvalidNumber(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.telemetry_dedupe_capacity, 10_000);
        assert_eq!(config.telemetry_dedupe_ttl, Duration::from_secs(21_600));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ADMIN_ADDR", "0.0.0.0:9000"),
            ("SQLITE_PATH", "sqlite::memory:"),
            ("TELEMETRY_DEDUPE_CAPACITY", "500"),
            ("TELEMETRY_DEDUPE_TTL_SECS", " 60 "),
        ])
        .unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.telemetry_dedupe_capacity, 500);
        assert_eq!(config.telemetry_dedupe_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("ADMIN_ADDR", "nope")]),
            Err(ConfigError::InvalidAddr)
        ));
        assert!(matches!(
            load(&[("TELEMETRY_DEDUPE_TTL_SECS", "-5")]),
            Err(ConfigError::InvalidNumber("TELEMETRY_DEDUPE_TTL_SECS"))
        ));
    }
}
