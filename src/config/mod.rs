//! Configuration loading and management
//!
//! Settings come from an optional YAML file (path in `BIZTIME_CONFIG`) and are
//! then overridden by environment variables:
//!
//! | Variable | Field |
//! |---|---|
//! | `BIZTIME_BIND_ADDR` | `bind_addr` |
//! | `DATABASE_URL` | `database_url` |
//! | `BIZTIME_LOG_LEVEL` | `log_level` |
//! | `BIZTIME_MAX_CONNECTIONS` | `max_connections` |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH_VAR: &str = "BIZTIME_CONFIG";

/// Process-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,

    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Upper bound for the connection pool
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            database_url: None,
            log_level: "info".to_string(),
            max_connections: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from `BIZTIME_CONFIG` (if set) and apply environment overrides
    pub fn load() -> Result<Self> {
        let base = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup
    ///
    /// Empty values are ignored. `lookup` is `std::env::var` in production.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(addr) = get("BIZTIME_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(url) = get("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(level) = get("BIZTIME_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(max) = get("BIZTIME_MAX_CONNECTIONS") {
            self.max_connections = max
                .parse()
                .with_context(|| format!("BIZTIME_MAX_CONNECTIONS is not a number: {}", max))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert!(config.database_url.is_none());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml_str("bind_addr: 0.0.0.0:8080\n").unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_url: postgres:///biztime").unwrap();
        writeln!(file, "log_level: debug").unwrap();

        let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres:///biztime"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(AppConfig::from_yaml_file("/nonexistent/biztime.yaml").is_err());
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let vars: HashMap<&str, &str> = [
            ("BIZTIME_BIND_ADDR", "0.0.0.0:9000"),
            ("DATABASE_URL", "postgres://db/biztime"),
            ("BIZTIME_LOG_LEVEL", ""),
            ("BIZTIME_MAX_CONNECTIONS", "12"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_yaml_str("log_level: warn\n")
            .unwrap()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.database_url.as_deref(), Some("postgres://db/biztime"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.max_connections, 12);
    }

    #[test]
    fn test_bad_max_connections() {
        let result = AppConfig::default().with_overrides(|key| {
            (key == "BIZTIME_MAX_CONNECTIONS").then(|| "lots".to_string())
        });
        assert!(result.is_err());
    }
}
