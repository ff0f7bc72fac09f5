//! ui::prompts
//!
//! Line-based prompts.
//!
//! # Design
//!
//! Prompts read whole lines, so they work the same on a terminal and on
//! piped stdin. They take any `BufRead`/`Write` pair; commands pass
//! stdin and stderr so stdout stays clean.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input ended before a response was given")]
    Eof,

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Prompt for a line of text.
///
/// `current` is shown in brackets. The answer is returned with surrounding
/// whitespace trimmed; an empty answer means "keep the current value".
pub fn input<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    message: &str,
    current: Option<&str>,
) -> Result<String, PromptError> {
    match current {
        Some(current) if !current.is_empty() => write!(writer, "{message} [{current}]: ")?,
        _ => write!(writer, "{message}: ")?,
    }
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(PromptError::Eof);
    }
    Ok(line.trim().to_string())
}

/// Prompt for confirmation (yes/no).
///
/// An empty answer selects `default`. Anything other than a yes/no word
/// re-asks.
pub fn confirm<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    message: &str,
    default: bool,
) -> Result<bool, PromptError> {
    let hint = if default { "Y/n" } else { "y/N" };
    loop {
        let answer = input(reader, writer, &format!("{message} [{hint}]"), None)?;
        match answer.to_ascii_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(writer, "Please answer 'y' or 'n'.")?,
        }
    }
}
