//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Example
//!
//! ```toml
//! [digest]
//! algorithm = "sha256"
//!
//! [save]
//! sync_timestamps = true
//! increment_revision = true
//!
//! [display]
//! json = false
//! ```
//!
//! Every field is optional; an absent field means "use the built-in
//! default". Values are validated after parsing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::integrity::DigestAlgorithm;

/// User configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub digest: Option<DigestSection>,
    pub save: Option<SaveSection>,
    pub display: Option<DisplaySection>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(algorithm) = self.digest.as_ref().and_then(|d| d.algorithm.as_deref()) {
            DigestAlgorithm::parse(algorithm)
                .map_err(|e| ConfigError::InvalidValue(format!("digest.algorithm: {e}")))?;
        }
        Ok(())
    }
}

/// `[digest]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DigestSection {
    /// Algorithm name, e.g. "sha256"
    pub algorithm: Option<String>,
}

/// `[save]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SaveSection {
    /// Align filesystem timestamps with Created/Modified after saving
    pub sync_timestamps: Option<bool>,

    /// Bump the revision on every save
    pub increment_revision: Option<bool>,
}

/// `[display]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplaySection {
    /// Print JSON instead of tables
    pub json: Option<bool>,
}

/// A settable configuration key, addressed as `section.field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DigestAlgorithm,
    SaveSyncTimestamps,
    SaveIncrementRevision,
    DisplayJson,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 4] = [
        ConfigKey::DigestAlgorithm,
        ConfigKey::SaveSyncTimestamps,
        ConfigKey::SaveIncrementRevision,
        ConfigKey::DisplayJson,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::DigestAlgorithm => "digest.algorithm",
            ConfigKey::SaveSyncTimestamps => "save.sync_timestamps",
            ConfigKey::SaveIncrementRevision => "save.increment_revision",
            ConfigKey::DisplayJson => "display.json",
        }
    }

    /// The value explicitly set in `config`, if any.
    pub fn get(self, config: &FileConfig) -> Option<String> {
        match self {
            ConfigKey::DigestAlgorithm => config.digest.as_ref()?.algorithm.clone(),
            ConfigKey::SaveSyncTimestamps => {
                config.save.as_ref()?.sync_timestamps.map(|b| b.to_string())
            }
            ConfigKey::SaveIncrementRevision => config
                .save
                .as_ref()?
                .increment_revision
                .map(|b| b.to_string()),
            ConfigKey::DisplayJson => config.display.as_ref()?.json.map(|b| b.to_string()),
        }
    }

    /// Parse `value` for this key and store it in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `value` does not parse.
    pub fn set(self, config: &mut FileConfig, value: &str) -> Result<(), ConfigError> {
        match self {
            ConfigKey::DigestAlgorithm => {
                let algorithm = DigestAlgorithm::parse(value)
                    .map_err(|e| ConfigError::InvalidValue(format!("{}: {e}", self.name())))?;
                config.digest.get_or_insert_with(Default::default).algorithm =
                    Some(algorithm.name().to_string());
            }
            ConfigKey::SaveSyncTimestamps => {
                config.save.get_or_insert_with(Default::default).sync_timestamps =
                    Some(self.parse_bool(value)?);
            }
            ConfigKey::SaveIncrementRevision => {
                config.save.get_or_insert_with(Default::default).increment_revision =
                    Some(self.parse_bool(value)?);
            }
            ConfigKey::DisplayJson => {
                config.display.get_or_insert_with(Default::default).json =
                    Some(self.parse_bool(value)?);
            }
        }
        Ok(())
    }

    fn parse_bool(self, value: &str) -> Result<bool, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(ConfigError::InvalidValue(format!(
                "{}: expected true or false, got '{value}'",
                self.name()
            ))),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.name() == s.trim())
            .ok_or_else(|| {
                let valid: Vec<_> = ConfigKey::ALL.iter().map(|k| k.name()).collect();
                ConfigError::InvalidValue(format!(
                    "unknown config key '{s}', must be one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod file_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = FileConfig::default();
            assert!(config.digest.is_none());
            assert!(config.save.is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn invalid_algorithm() {
            let config = FileConfig {
                digest: Some(DigestSection {
                    algorithm: Some("crc32".to_string()),
                }),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn roundtrip() {
            let config = FileConfig {
                digest: Some(DigestSection {
                    algorithm: Some("sha512".to_string()),
                }),
                save: Some(SaveSection {
                    sync_timestamps: Some(false),
                    increment_revision: Some(true),
                }),
                display: Some(DisplaySection { json: Some(true) }),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: FileConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }

        #[test]
        fn reject_unknown_fields() {
            let toml = r#"
                [save]
                sync_timestamps = true
                backup = true
            "#;

            let result: Result<FileConfig, _> = toml::from_str(toml);
            assert!(result.is_err());
        }
    }

    mod config_key {
        use super::*;

        #[test]
        fn parse_all_names() {
            for key in ConfigKey::ALL {
                assert_eq!(key.name().parse::<ConfigKey>().unwrap(), key);
            }
            assert!("save.backup".parse::<ConfigKey>().is_err());
        }

        #[test]
        fn set_then_get() {
            let mut config = FileConfig::default();
            ConfigKey::DigestAlgorithm.set(&mut config, "SHA-512").unwrap();
            ConfigKey::SaveSyncTimestamps.set(&mut config, "no").unwrap();

            assert_eq!(
                ConfigKey::DigestAlgorithm.get(&config).as_deref(),
                Some("sha512")
            );
            assert_eq!(
                ConfigKey::SaveSyncTimestamps.get(&config).as_deref(),
                Some("false")
            );
            assert_eq!(ConfigKey::DisplayJson.get(&config), None);
        }

        #[test]
        fn set_rejects_bad_values() {
            let mut config = FileConfig::default();
            assert!(ConfigKey::DisplayJson.set(&mut config, "maybe").is_err());
            assert!(ConfigKey::DigestAlgorithm.set(&mut config, "crc32").is_err());
            assert_eq!(config, FileConfig::default());
        }
    }
}
