//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration through the [`Context`]
//! 2. Opens a session (or calls an integrity helper directly)
//! 3. Formats and displays output
//!
//! Handlers never read or write document contents themselves.

mod completion;
mod config_cmd;
mod digest;
mod edit;
mod formats;
mod show;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, path as config_path, set as config_set};
pub use digest::digest;
pub use edit::{edit, EditOptions};
pub use formats::formats;
pub use show::show;

use crate::cli::args::{Command, ConfigAction};
use crate::cli::Context;
use anyhow::Result;

pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Show { file, json } => show::show(ctx, &file, json),
        Command::Edit {
            file,
            assignments,
            interactive,
            dry_run,
            no_sync_times,
            algorithm,
            json,
        } => edit::edit(
            ctx,
            &file,
            &EditOptions {
                assignments,
                interactive,
                dry_run,
                no_sync_times,
                algorithm,
                json,
            },
        ),
        Command::Digest { file, algorithm } => digest::digest(ctx, &file, algorithm.as_deref()),
        Command::Formats { json } => formats::formats(json),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
            ConfigAction::Path => config_cmd::path(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}
