//! Configuration system for the moviedash server
//!
//! Loads configuration from:
//! 1. config.yaml - operational settings (port, database, logging, budgets)
//! 2. .env file - local overrides
//!
//! Environment variables always override config.yaml values.

use moviedash_duck::ExecutionBudget;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// DuckDB file holding the `movies` table
    pub path: String,

    /// Create the sample dataset when the table is missing
    #[serde(default = "default_seed_sample")]
    pub seed_sample: bool,
}

fn default_seed_sample() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/movies.duckdb".to_string(),
            seed_sample: true,
        }
    }
}

/// Execution limits applied to every query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub max_rows: Option<u64>,

    #[serde(default)]
    pub memory_limit_mb: Option<u64>,
}

impl ExecutionConfig {
    pub fn budget(&self) -> ExecutionBudget {
        ExecutionBudget {
            max_memory_mb: self.memory_limit_mb,
            max_rows: self.max_rows,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or module-specific
    pub level: String,

    /// Output format: pretty, json, compact
    pub format: String,

    /// Output destination: stdout, file, both
    pub output: String,

    /// Directory for log files
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            output: "stdout".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from YAML file with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file means defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            return Self::load(path);
        }
        let mut config = Config::default();
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("MOVIEDASH_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("MOVIEDASH_SERVER_PORT") {
            if let Ok(port_num) = port.parse() {
                self.server.port = port_num;
            }
        }

        if let Ok(path) = std::env::var("MOVIEDASH_DATABASE") {
            self.database.path = path;
        }
        if let Ok(seed) = std::env::var("MOVIEDASH_SEED_SAMPLE") {
            if let Ok(seed) = seed.parse() {
                self.database.seed_sample = seed;
            }
        }

        if let Ok(max_rows) = std::env::var("MOVIEDASH_MAX_ROWS") {
            if let Ok(max_rows) = max_rows.parse() {
                self.execution.max_rows = Some(max_rows);
            }
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            self.logging.directory = dir;
        }
    }

    /// Set logging environment variables for the logging module
    pub fn apply_logging_env(&self) {
        std::env::set_var("RUST_LOG", &self.logging.level);
        std::env::set_var("LOG_FORMAT", &self.logging.format);
        std::env::set_var("LOG_OUTPUT", &self.logging.output);
        std::env::set_var("LOG_DIR", &self.logging.directory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, "data/movies.duckdb");
        assert!(config.database.seed_sample);
        assert_eq!(config.execution.max_rows, None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.output, "stdout");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str(
            r#"
database:
  path: "/tmp/other.duckdb"
execution:
  max_rows: 500
"#,
        )
        .unwrap();

        assert_eq!(config.database.path, "/tmp/other.duckdb");
        assert!(config.database.seed_sample);
        assert_eq!(config.execution.budget().max_rows, Some(500));
        assert_eq!(config.execution.budget().max_memory_mb, None);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_env_var_override() {
        std::env::set_var("MOVIEDASH_SERVER_PORT", "9090");
        std::env::set_var("MOVIEDASH_SEED_SAMPLE", "false");

        // Create a temp config file
        let config_yaml = r#"
server:
  host: "127.0.0.1"
  port: 8080
database:
  path: "data/movies.duckdb"
  seed_sample: true
logging:
  level: "info"
  format: "pretty"
  output: "stdout"
  directory: "./logs"
"#;
        let temp_file = std::env::temp_dir().join("moviedash_test_config.yaml");
        std::fs::write(&temp_file, config_yaml).unwrap();

        let config = Config::load(&temp_file).unwrap();
        assert_eq!(config.server.port, 9090); // Overridden
        assert!(!config.database.seed_sample); // Overridden

        std::env::remove_var("MOVIEDASH_SERVER_PORT");
        std::env::remove_var("MOVIEDASH_SEED_SAMPLE");
        std::fs::remove_file(temp_file).ok();
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("moviedash_no_such_config.yaml");
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");

        assert!(matches!(Config::load(&path), Err(ConfigError::Io(_))));
    }
}
