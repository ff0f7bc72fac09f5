//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Line-based prompts and confirmations
//! - [`output`] - Verbosity-aware output and diagnostics
//! - [`table`] - Plain-text tables
//!
//! # Design
//!
//! All output and prompts go through this module so that quiet, debug and
//! JSON modes behave the same in every command.

pub mod output;
pub mod prompts;
pub mod table;
