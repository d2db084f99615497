//! Bridge configuration
//!
//! Loaded from `vmbridge.toml` next to the plugin (or any parent directory).
//! Everything defaults: an absent file configures a current-interface bridge
//! logging at info level to stderr.

use core::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::host::HostVariant;
use crate::logging::{LogConfig, LogFormat, LogOutput};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub variant: VariantSetting,

    #[serde(default)]
    pub logging: LogSettings,
}

/// Which host interface variant to assume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantSetting {
    /// Trust whatever build detection reported.
    #[default]
    Auto,
    /// Force the refactored interface.
    Current,
    /// Force the legacy vtable interface.
    Legacy,
}

impl VariantSetting {
    /// The forced variant, if this setting overrides detection.
    pub fn forced(self) -> Option<HostVariant> {
        match self {
            Self::Auto => None,
            Self::Current => Some(HostVariant::Current),
            Self::Legacy => Some(HostVariant::Legacy),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: FormatSetting,

    /// Log to a daily-rotated file in this directory instead of stderr.
    #[serde(default)]
    pub directory: Option<String>,

    /// Extra filter directives, e.g. "vmbridge=trace".
    #[serde(default)]
    pub filter: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: FormatSetting::default(),
            directory: None,
            filter: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatSetting {
    Pretty,
    #[default]
    Compact,
    Json,
}

fn default_level() -> String {
    "info".to_owned()
}

impl BridgeConfig {
    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
        Self::parse(&content)
    }

    /// Find and load `vmbridge.toml` from the working directory or a parent.
    /// Falls back to defaults when nothing is found or a candidate is broken.
    pub fn discover() -> Self {
        let mut current = std::env::current_dir().ok();

        while let Some(dir) = current {
            let candidate = dir.join("vmbridge.toml");
            if candidate.exists() {
                if let Ok(config) = Self::load(&candidate) {
                    return config;
                }
            }
            current = dir.parent().map(|p| p.to_path_buf());
        }

        Self::default()
    }

    /// Lower the logging section into a [`LogConfig`].
    pub fn log_config(&self) -> LogConfig {
        let level = self.logging.level.parse::<Level>().unwrap_or(Level::INFO);
        let format = match self.logging.format {
            FormatSetting::Pretty => LogFormat::Pretty,
            FormatSetting::Compact => LogFormat::Compact,
            FormatSetting::Json => LogFormat::Json,
        };
        let output = match &self.logging.directory {
            Some(directory) => LogOutput::File {
                directory: directory.clone(),
                prefix: "vmbridge".to_owned(),
            },
            None => LogOutput::Stderr,
        };

        let mut config = LogConfig::new()
            .with_level(level)
            .with_format(format)
            .with_output(output);
        if let Some(filter) = &self.logging.filter {
            config = config.with_filter(filter.clone());
        }
        config
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    Read(String),
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(msg) => write!(f, "failed to read config: {msg}"),
            Self::Parse(msg) => write!(f, "failed to parse config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_auto_and_info() {
        let config = BridgeConfig::default();
        assert_eq!(config.variant, VariantSetting::Auto);
        assert_eq!(config.variant.forced(), None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.log_config().level, Level::INFO);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
variant = "legacy"

[logging]
level = "debug"
format = "json"
directory = "Data/Logs"
filter = "vmbridge=trace"
"#;
        let config = BridgeConfig::parse(toml).unwrap();
        assert_eq!(config.variant.forced(), Some(HostVariant::Legacy));

        let log = config.log_config();
        assert_eq!(log.level, Level::DEBUG);
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(
            log.output,
            LogOutput::File {
                directory: "Data/Logs".to_owned(),
                prefix: "vmbridge".to_owned(),
            }
        );
        assert_eq!(log.filter.as_deref(), Some("vmbridge=trace"));
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = BridgeConfig::parse("[logging]\nlevel = \"chatty\"\n").unwrap();
        assert_eq!(config.log_config().level, Level::INFO);
    }

    #[test]
    fn broken_toml_is_a_parse_error() {
        let err = BridgeConfig::parse("variant = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vmbridge.toml");
        fs::write(&path, "variant = \"current\"\n").unwrap();

        let config = BridgeConfig::load(&path).unwrap();
        assert_eq!(config.variant.forced(), Some(HostVariant::Current));
    }

    #[test]
    fn load_missing_file_is_a_read_error() {
        let err = BridgeConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read(_)));
    }
}
