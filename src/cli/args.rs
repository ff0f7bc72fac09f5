//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docmeta - inspect and edit document metadata
#[derive(Parser, Debug)]
#[command(name = "docmeta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this config file instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a document's metadata and any issues
    #[command(
        name = "show",
        long_about = "Show a document's metadata and any issues.\n\n\
            Spreadsheets and word-processing documents show the fixed property \
            schema with an Issues column. PDFs and images show their metadata \
            as found; those formats are read-only.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Inspect a spreadsheet
    docmeta show report.xlsx

    # Machine-readable output
    docmeta show report.xlsx --json"
    )]
    Show {
        /// Document to inspect
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Edit metadata, save, and report the file digest
    #[command(
        name = "edit",
        long_about = "Edit metadata, save, and report the file digest.\n\n\
            Edits are merged with the current values: an empty value keeps the \
            current one. The revision is incremented on every save. Dates use \
            'YYYY-MM-DD HH:MM:SS'. Nothing is written if any value is invalid.\n\n\
            After saving, the file's modification time is set from Modified \
            (and its creation time from Created where the platform allows).",
        after_help = "\
WORKFLOW EXAMPLES:
    # Set a title and author
    docmeta edit report.docx --set Title='Q3 Report' --set Creator=Ada

    # Preview the result without writing
    docmeta edit report.docx --set Modified='2024-05-01 09:00:00' --dry-run

    # Walk through every property
    docmeta edit report.docx --interactive"
    )]
    Edit {
        /// Document to edit
        file: PathBuf,

        /// Property assignment; may be repeated
        #[arg(long = "set", value_name = "KEY=VALUE")]
        assignments: Vec<String>,

        /// Prompt for each property
        #[arg(short, long)]
        interactive: bool,

        /// Show the reconciled metadata without writing
        #[arg(long)]
        dry_run: bool,

        /// Leave filesystem timestamps alone
        #[arg(long)]
        no_sync_times: bool,

        /// Digest algorithm (sha224, sha256, sha384, sha512, md5)
        #[arg(long, value_name = "ALG")]
        algorithm: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the digest of a file
    #[command(
        name = "digest",
        after_help = "\
WORKFLOW EXAMPLES:
    docmeta digest report.xlsx
    docmeta digest photo.jpg --algorithm md5"
    )]
    Digest {
        /// File to hash
        file: PathBuf,

        /// Digest algorithm (sha224, sha256, sha384, sha512, md5)
        #[arg(long, value_name = "ALG")]
        algorithm: Option<String>,
    },

    /// List supported formats
    #[command(name = "formats")]
    Formats {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        long_about = "Get, set, or list configuration values.\n\n\
            Settings live in a TOML file (see 'docmeta config path').",
        after_help = "\
WORKFLOW EXAMPLES:
    # List all configuration values
    docmeta config list

    # Get a specific value
    docmeta config get digest.algorithm

    # Set a value
    docmeta config set save.sync_timestamps false"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    docmeta completion bash >> ~/.bashrc

    # Zsh
    docmeta completion zsh > ~/.zfunc/_docmeta

    # Fish
    docmeta completion fish > ~/.config/fish/completions/docmeta.fish

    # PowerShell
    docmeta completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
    /// Print the config file location
    Path,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_assignments() {
        let cli = Cli::try_parse_from([
            "docmeta",
            "edit",
            "a.xlsx",
            "--set",
            "Title=x",
            "--set",
            "Creator=y",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Command::Edit {
                assignments,
                dry_run,
                ..
            } => {
                assert_eq!(assignments, vec!["Title=x", "Creator=y"]);
                assert!(dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["docmeta", "show", "a.pdf", "-q", "--config", "c.toml"])
            .unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }
}
