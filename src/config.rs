//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub views: ViewsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Event feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Frames longer than this are skipped
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Empty every view when the feed closes or fails
    #[serde(default = "default_reset_on_disconnect")]
    pub reset_on_disconnect: bool,
}

fn default_max_frame_bytes() -> usize {
    64 * 1024 // 64 KB
}

fn default_reset_on_disconnect() -> bool {
    true
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: default_max_frame_bytes(),
            reset_on_disconnect: default_reset_on_disconnect(),
        }
    }
}

/// Direction of an ordered region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            other => Err(ConfigError::Invalid(format!("unknown sort order: {}", other))),
        }
    }
}

/// View regions configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ViewsConfig {
    /// Order of the wallet list by balance
    #[serde(default = "default_wallet_order")]
    pub wallet_order: SortOrder,

    /// Stage shown in the main view at startup
    #[serde(default)]
    pub open_stage: Option<String>,
}

fn default_wallet_order() -> SortOrder {
    SortOrder::Descending
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            wallet_order: default_wallet_order(),
            open_stage: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
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

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
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
        let config_paths = [
            dirs::config_dir().map(|p| p.join("drum").join("config.toml")),
            Some(PathBuf::from("./drum.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply `DRUM_*` overrides read through `lookup`
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Feed overrides
        if let Some(max) = lookup("DRUM_MAX_FRAME_BYTES") {
            match max.parse() {
                Ok(n) => self.feed.max_frame_bytes = n,
                Err(_) => tracing::warn!(value = %max, "Ignoring invalid DRUM_MAX_FRAME_BYTES"),
            }
        }
        if let Some(reset) = lookup("DRUM_RESET_ON_DISCONNECT") {
            match reset.parse() {
                Ok(b) => self.feed.reset_on_disconnect = b,
                Err(_) => tracing::warn!(value = %reset, "Ignoring invalid DRUM_RESET_ON_DISCONNECT"),
            }
        }

        // View overrides
        if let Some(order) = lookup("DRUM_WALLET_ORDER") {
            match order.parse() {
                Ok(o) => self.views.wallet_order = o,
                Err(e) => tracing::warn!(error = %e, "Ignoring DRUM_WALLET_ORDER"),
            }
        }
        if let Some(stage) = lookup("DRUM_OPEN_STAGE") {
            self.views.open_stage = Some(stage).filter(|s| !s.is_empty());
        }

        // Logging overrides
        if let Some(level) = lookup("DRUM_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("DRUM_LOG_FORMAT") {
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

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Drum Configuration
#
# Environment variables override these settings:
# - DRUM_MAX_FRAME_BYTES
# - DRUM_RESET_ON_DISCONNECT
# - DRUM_WALLET_ORDER
# - DRUM_OPEN_STAGE
# - DRUM_LOG_LEVEL
# - DRUM_LOG_FORMAT

[feed]
# Frames longer than this many bytes are skipped
max_frame_bytes = 65536

# Empty every view when the feed closes or fails
reset_on_disconnect = true

[views]
# Wallet list order by balance: ascending or descending
wallet_order = "descending"

# Stage shown in the main view at startup
# open_stage = "aereum"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.feed.max_frame_bytes, 65536);
        assert!(config.feed.reset_on_disconnect);
        assert_eq!(config.views.wallet_order, SortOrder::Descending);
        assert_eq!(config.views.open_stage, None);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.feed.max_frame_bytes, 65536);
        assert_eq!(config.views.wallet_order, SortOrder::Descending);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[views]\nwallet_order = \"ascending\"\nopen_stage = \"aereum\"\n\n[feed]\nreset_on_disconnect = false"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.views.wallet_order, SortOrder::Ascending);
        assert_eq!(config.views.open_stage.as_deref(), Some("aereum"));
        assert!(!config.feed.reset_on_disconnect);
        assert_eq!(config.feed.max_frame_bytes, 65536);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[views]\nwallet_order = \"sideways\"").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("DRUM_MAX_FRAME_BYTES", "1024"),
            ("DRUM_RESET_ON_DISCONNECT", "false"),
            ("DRUM_WALLET_ORDER", "asc"),
            ("DRUM_OPEN_STAGE", "aereum"),
            ("DRUM_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.feed.max_frame_bytes, 1024);
        assert!(!config.feed.reset_on_disconnect);
        assert_eq!(config.views.wallet_order, SortOrder::Ascending);
        assert_eq!(config.views.open_stage.as_deref(), Some("aereum"));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|name| match name {
            "DRUM_MAX_FRAME_BYTES" => Some("many".to_string()),
            "DRUM_WALLET_ORDER" => Some("sideways".to_string()),
            _ => None,
        });
        assert_eq!(config.feed.max_frame_bytes, 65536);
        assert_eq!(config.views.wallet_order, SortOrder::Descending);
    }
}
