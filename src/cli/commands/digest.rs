//! digest command - Print a file's content digest

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::integrity::{self, DigestAlgorithm};
use crate::ui::output::{self, Verbosity};

/// Print the digest of `file`.
///
/// Any file can be hashed; the format is not detected. In quiet mode only
/// the hex digest is printed.
pub fn digest(ctx: &Context, file: &Path, algorithm: Option<&str>) -> Result<()> {
    let config = ctx.load_config()?;
    let algorithm = match algorithm {
        Some(name) => DigestAlgorithm::parse(name)?,
        None => config.digest_algorithm(),
    };
    output::debug(format!("hashing with {}", algorithm.label()), ctx.verbosity());

    let hex = integrity::digest(file, algorithm)
        .with_context(|| format!("Failed to hash '{}'", file.display()))?;

    if ctx.verbosity() == Verbosity::Quiet {
        output::data(hex);
    } else {
        output::data(format!("File Hash ({}): {}", algorithm.label(), hex));
    }
    Ok(())
}
