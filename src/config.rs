//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::entity::EntityKind;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// File the config was read from, if any
    #[serde(skip)]
    pub origin: Option<PathBuf>,

    /// Problems recovered from while loading. Loading runs before logging is
    /// set up, so callers report these once a subscriber is installed.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Where entity records are read from
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    /// Snapshot file, `-` for stdin
    pub snapshot: Option<PathBuf>,
}

/// Query defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryConfig {
    /// Entity kind used when the command line does not pick one
    #[serde(default)]
    pub default_kind: EntityKind,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Layout of log events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human oriented
    Pretty,
    /// One line per event
    Full,
    Json,
}

impl LoggingConfig {
    /// Unrecognised formats fall back to one line per event
    pub fn log_format(&self) -> LogFormat {
        match self.format.as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => LogFormat::Full,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        config.origin = Some(path.to_path_buf());

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("bateau").join("config.toml")),
            Some(PathBuf::from("/etc/bateau/config.toml")),
            Some(PathBuf::from("./bateau.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first existing candidate that parses, remembering the ones
    /// that failed
    fn load_first(paths: &[PathBuf]) -> Self {
        let mut failures = Vec::new();

        for path in paths.iter().filter(|path| path.exists()) {
            match Self::load_with_env(path) {
                Ok(mut config) => {
                    failures.append(&mut config.warnings);
                    config.warnings = failures;
                    return config;
                }
                Err(e) => failures.push(e.to_string()),
            }
        }

        let mut config = Self::from_env();
        failures.append(&mut config.warnings);
        config.warnings = failures;
        config
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(snapshot) = var("BATEAU_SNAPSHOT") {
            self.source.snapshot = Some(PathBuf::from(snapshot));
        }

        if let Some(kind) = var("BATEAU_DEFAULT_KIND") {
            match kind.parse() {
                Ok(kind) => self.query.default_kind = kind,
                Err(e) => self
                    .warnings
                    .push(format!("Ignoring BATEAU_DEFAULT_KIND: {}", e)),
            }
        }

        if let Some(level) = var("BATEAU_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("BATEAU_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Bateau Configuration
#
# Environment variables override these settings:
# - BATEAU_SNAPSHOT
# - BATEAU_DEFAULT_KIND
# - BATEAU_LOG_LEVEL
# - BATEAU_LOG_FORMAT

[source]
# JSON snapshot of containers and images ("-" reads stdin)
# snapshot = "/var/lib/bateau/snapshot.json"

[query]
# Entity kind queried when neither --containers nor --images is given
default_kind = "containers"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (multi-line), full (one line per event)
# or json (for log shippers)
format = "pretty"

# Optional log file path
# file = "/var/log/bateau/bateau.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.source.snapshot.is_none());
        assert_eq!(config.query.default_kind, EntityKind::Container);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_log_format() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.log_format(), LogFormat::Pretty);

        logging.format = "json".to_string();
        assert_eq!(logging.log_format(), LogFormat::Json);

        logging.format = "full".to_string();
        assert_eq!(logging.log_format(), LogFormat::Full);

        logging.format = "compact".to_string();
        assert_eq!(logging.log_format(), LogFormat::Full);
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[source]
snapshot = "/tmp/fleet.json"

[query]
default_kind = "images"

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.source.snapshot, Some(PathBuf::from("/tmp/fleet.json")));
        assert_eq!(config.query.default_kind, EntityKind::Image);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.query.default_kind, EntityKind::Container);
        assert!(config.source.snapshot.is_none());
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/bateau.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[query]\ndefault_kind = \"volumes\"").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([
            ("BATEAU_SNAPSHOT", "-"),
            ("BATEAU_DEFAULT_KIND", "image"),
            ("BATEAU_LOG_LEVEL", "debug"),
        ]);

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.source.snapshot, Some(PathBuf::from("-")));
        assert_eq!(config.query.default_kind, EntityKind::Image);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_bad_kind_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "BATEAU_DEFAULT_KIND").then(|| "volume".to_string()));
        assert_eq!(config.query.default_kind, EntityKind::Container);
        assert_eq!(config.warnings.len(), 1);
        assert!(config.warnings[0].contains("BATEAU_DEFAULT_KIND"));
    }

    #[test]
    fn test_load_first_skips_broken_files() {
        let mut broken = NamedTempFile::new().unwrap();
        writeln!(broken, "[query]\ndefault_kind = \"volumes\"").unwrap();
        let mut good = NamedTempFile::new().unwrap();
        writeln!(good, "[logging]\nformat = \"json\"").unwrap();

        let paths = vec![
            PathBuf::from("/nonexistent/bateau.toml"),
            broken.path().to_path_buf(),
            good.path().to_path_buf(),
        ];
        let config = Config::load_first(&paths);

        assert_eq!(config.origin.as_deref(), Some(good.path()));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.warnings.len(), 1);
        assert!(config.warnings[0].starts_with("Failed to parse config file"));
    }

    #[test]
    fn test_load_first_falls_back_to_defaults() {
        let mut broken = NamedTempFile::new().unwrap();
        writeln!(broken, "not toml at all [").unwrap();

        let config = Config::load_first(&[broken.path().to_path_buf()]);
        assert!(config.origin.is_none());
        assert_eq!(config.warnings.len(), 1);
    }
}
