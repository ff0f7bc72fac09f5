//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order; the first one that exists wins:
//! 1. `--config <PATH>` (a missing file is a warning, not an error)
//! 2. `$DOCMETA_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/docmeta/config.toml`
//! 4. `~/.docmeta/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use docmeta::core::config::Config;
//!
//! let result = Config::load(None).unwrap();
//! let config = result.config;
//!
//! println!("Digest: {}", config.digest_algorithm());
//! println!("Sync timestamps: {}", config.sync_timestamps());
//! ```

pub mod schema;

pub use schema::{ConfigKey, DigestSection, DisplaySection, FileConfig, SaveSection};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::ReconcileOptions;
use crate::integrity::DigestAlgorithm;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "DOCMETA_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Where to look for a config file.
///
/// Built from the process environment by [`Config::load`]; tests build
/// one directly.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub explicit: Option<PathBuf>,
    pub env: Option<PathBuf>,
    pub xdg_config_home: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl ConfigSources {
    /// Sources from the environment plus an optional `--config` path.
    pub fn from_env(explicit: Option<&Path>) -> Self {
        Self {
            explicit: explicit.map(Path::to_path_buf),
            env: std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            xdg_config_home: std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            home: dirs::home_dir(),
        }
    }

    fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        candidates.extend(self.env.clone());
        if let Some(xdg) = &self.xdg_config_home {
            candidates.push(xdg.join("docmeta/config.toml"));
        }
        if let Some(home) = &self.home {
            candidates.push(home.join(".docmeta/config.toml"));
        }
        candidates
    }

    /// Where `config set` writes.
    ///
    /// An explicit or environment path is used as-is; otherwise the file
    /// already in use, falling back to `~/.docmeta/config.toml`.
    pub fn write_path(&self, loaded_from: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = self.explicit.as_ref().or(self.env.as_ref()) {
            return Ok(path.clone());
        }
        if let Some(path) = loaded_from {
            return Ok(path.to_path_buf());
        }
        let home = self.home.as_ref().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".docmeta/config.toml"))
    }
}

/// Effective configuration.
///
/// Accessors apply built-in defaults for anything the file leaves unset.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: FileConfig,
    /// Path the file was loaded from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// holds invalid values. Missing config files are not an error
    /// (defaults are used).
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_from(&ConfigSources::from_env(explicit))
    }

    /// Load configuration from the given sources.
    pub fn load_from(sources: &ConfigSources) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        if let Some(path) = &sources.explicit {
            if path.exists() {
                return Self::read(path).map(|config| ConfigLoadResult { config, warnings });
            }
            warnings.push(ConfigWarning {
                message: "config file does not exist; using defaults".to_string(),
                path: path.clone(),
            });
            return Ok(ConfigLoadResult {
                config: Config::default(),
                warnings,
            });
        }

        for path in sources.candidates() {
            if path.exists() {
                return Self::read(&path).map(|config| ConfigLoadResult { config, warnings });
            }
        }

        Ok(ConfigLoadResult {
            config: Config::default(),
            warnings,
        })
    }

    /// Read, parse and validate a config file.
    fn read(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Config {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed. Writes to a temp file in the
    /// same directory, then renames it over `path`.
    pub fn write_atomic(path: &Path, config: &FileConfig) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Digest algorithm for `edit` and `digest`.
    ///
    /// Defaults to SHA-256. The value was validated on load.
    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        self.file
            .digest
            .as_ref()
            .and_then(|d| d.algorithm.as_deref())
            .and_then(|name| DigestAlgorithm::parse(name).ok())
            .unwrap_or_default()
    }

    /// Whether saving aligns filesystem timestamps.
    ///
    /// Defaults to `true`.
    pub fn sync_timestamps(&self) -> bool {
        self.file
            .save
            .as_ref()
            .and_then(|s| s.sync_timestamps)
            .unwrap_or(true)
    }

    /// Whether saving bumps the revision.
    ///
    /// Defaults to `true`.
    pub fn increment_revision(&self) -> bool {
        self.file
            .save
            .as_ref()
            .and_then(|s| s.increment_revision)
            .unwrap_or(true)
    }

    /// Whether output defaults to JSON.
    ///
    /// Defaults to `false`.
    pub fn json_output(&self) -> bool {
        self.file
            .display
            .as_ref()
            .and_then(|d| d.json)
            .unwrap_or(false)
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            increment_revision: self.increment_revision(),
        }
    }

    /// Effective value of `key`, with defaults applied.
    pub fn effective(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::DigestAlgorithm => self.digest_algorithm().name().to_string(),
            ConfigKey::SaveSyncTimestamps => self.sync_timestamps().to_string(),
            ConfigKey::SaveIncrementRevision => self.increment_revision().to_string(),
            ConfigKey::DisplayJson => self.json_output().to_string(),
        }
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
