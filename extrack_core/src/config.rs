//! Configuration file support for extrack.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/extrack/config.toml`,
//! then environment overrides (`PORT`, `EXTRACK_STORE`,
//! `EXTRACK_LOG_FORMAT`) are applied.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable overriding `server.port`
pub const PORT_ENV: &str = "PORT";

/// Environment variable overriding `store.url`
pub const STORE_ENV: &str = "EXTRACK_STORE";

/// Environment variable overriding `logging.format`
pub const LOG_FORMAT_ENV: &str = "EXTRACK_LOG_FORMAT";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of static assets served alongside the API
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: None,
        }
    }
}

/// Exercise store configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Connection string: `memory:`, `file:<path>` or a bare path
    #[serde(default = "default_store_url")]
    pub url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
        }
    }
}

/// Log output configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Rendering of log events on stderr
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable events
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::Config(format!(
                "unknown log format '{other}', expected 'compact' or 'json'"
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Compact => f.write_str("compact"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_store_url() -> String {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    format!("file:{}", base.join("extrack").join("users.json").display())
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("extrack").join("config.toml"))
    }

    /// Apply `PORT`, `EXTRACK_STORE` and `EXTRACK_LOG_FORMAT` from the
    /// process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup(PORT_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("invalid {PORT_ENV} '{port}': {e}")))?;
        }
        if let Some(url) = lookup(STORE_ENV).filter(|v| !v.trim().is_empty()) {
            self.store.url = url;
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV).filter(|v| !v.trim().is_empty()) {
            self.logging.format = format.parse()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert!(config.server.static_dir.is_none());
        assert!(config.store.url.starts_with("file:"));
        assert!(config.store.url.ends_with("users.json"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.server.port, parsed.server.port);
        assert_eq!(config.store.url, parsed.store.url);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[server]
static_dir = "public"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.static_dir, Some(PathBuf::from("public")));
        assert_eq!(config.server.port, 3000); // default
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[store]\nurl = \"memory:\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.store.url, "memory:");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[(PORT_ENV, "8080"), (STORE_ENV, "memory:")]))
            .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.url, "memory:");
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(env(&[(PORT_ENV, "  ")])).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_logging_section() {
        let toml_str = r#"
[logging]
level = "extrack_core=debug,info"
format = "json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.level, "extrack_core=debug,info");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_log_format_env_override() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[(LOG_FORMAT_ENV, "JSON")]))
            .unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);

        let result = config.apply_overrides(env(&[(LOG_FORMAT_ENV, "pretty")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_port_env() {
        let mut config = Config::default();
        let result = config.apply_overrides(env(&[(PORT_ENV, "eighty")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
