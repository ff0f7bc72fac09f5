//! config command - Get, set, or list configuration values

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::core::config::{Config, ConfigKey, ConfigSources, FileConfig};
use crate::ui::output;

/// Get a configuration value (with defaults applied).
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let key: ConfigKey = key.parse()?;
    let config = ctx.load_config()?;
    output::data(config.effective(key));
    Ok(())
}

/// Set a configuration value.
///
/// Only the named key changes; other settings already in the target file
/// are kept.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let key: ConfigKey = key.parse()?;
    let config = ctx.load_config()?;
    let path = ConfigSources::from_env(ctx.config_path.as_deref())
        .write_path(config.loaded_from())?;

    let mut file = if config.loaded_from() == Some(path.as_path()) {
        config.file.clone()
    } else {
        FileConfig::default()
    };
    key.set(&mut file, value)?;
    file.validate()?;

    Config::write_atomic(&path, &file).context("Failed to write config")?;
    output::debug(format!("wrote {}", path.display()), ctx.verbosity());
    output::success(
        format!("Set {} = {}", key, key.get(&file).unwrap_or_default()),
        ctx.verbosity(),
    );
    Ok(())
}

/// List all configuration values.
pub fn list(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;

    match config.loaded_from() {
        Some(path) => output::data(format!("# {}", path.display())),
        None => output::data("# (defaults)"),
    }
    for key in ConfigKey::ALL {
        output::data(format!("{} = {}", key, config.effective(key)));
    }
    Ok(())
}

/// Print the config file location `config set` would write to.
pub fn path(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    let path = ConfigSources::from_env(ctx.config_path.as_deref())
        .write_path(config.loaded_from())?;
    output::data(path.display());
    Ok(())
}
