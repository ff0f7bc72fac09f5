//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and build the execution [`Context`]
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers open a [`crate::session::Session`] and
//! format its results; all document reads and writes happen there.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::{Config, ConfigLoadResult};
use crate::ui::output::{self, Verbosity};

/// Execution context shared by all commands.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Config file override from `--config`.
    pub config_path: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Load configuration, reporting warnings and the source in use.
    pub fn load_config(&self) -> Result<Config> {
        let ConfigLoadResult { config, warnings } =
            Config::load(self.config_path.as_deref()).context("Failed to load config")?;

        let verbosity = self.verbosity();
        for warning in warnings {
            output::warn(
                format!("{} ({})", warning.message, warning.path.display()),
                verbosity,
            );
        }
        match config.loaded_from() {
            Some(path) => output::debug(format!("config: {}", path.display()), verbosity),
            None => output::debug("config: built-in defaults", verbosity),
        }
        Ok(config)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = Context {
        config_path: cli.config.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
