//! edit command - Reconcile edits, save, and report the file digest

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::show::{format_line, record_table};
use crate::cli::Context;
use crate::core::{Edits, IssueReport, MetadataRecord, Property, Timestamp};
use crate::formats::{DocumentFormat, FormatRegistry};
use crate::integrity::{DigestAlgorithm, TimestampKind};
use crate::session::{SaveOptions, SaveReport, Session};
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts;

/// Flags for [`edit`].
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    pub assignments: Vec<String>,
    pub interactive: bool,
    pub dry_run: bool,
    pub no_sync_times: bool,
    pub algorithm: Option<String>,
    pub json: bool,
}

#[derive(Serialize)]
struct PreviewOutput<'a> {
    file: &'a Path,
    format: DocumentFormat,
    dry_run: bool,
    record: &'a MetadataRecord,
    issues: &'a IssueReport,
}

#[derive(Serialize)]
struct SaveOutput<'a> {
    file: &'a Path,
    format: DocumentFormat,
    #[serde(flatten)]
    report: &'a SaveReport,
}

/// Edit a document's metadata.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `file` - Document to edit
/// * `opts` - Assignments and flags
pub fn edit(ctx: &Context, file: &Path, opts: &EditOptions) -> Result<()> {
    let config = ctx.load_config()?;
    let verbosity = ctx.verbosity();
    let algorithm = match opts.algorithm.as_deref() {
        Some(name) => DigestAlgorithm::parse(name)?,
        None => config.digest_algorithm(),
    };

    let mut session = Session::open(file, &FormatRegistry::with_defaults())
        .with_context(|| format!("Failed to open '{}'", file.display()))?;
    session.set_edits(Edits::from_assignments(&opts.assignments)?)?;

    if opts.interactive {
        let mut reader = std::io::stdin().lock();
        let mut writer = std::io::stderr();
        prompt_edits(&mut session, &mut reader, &mut writer, verbosity)?;
        if !opts.dry_run
            && !prompts::confirm(&mut reader, &mut writer, "Save changes?", true)?
        {
            output::print("Aborted: nothing was written.", verbosity);
            return Ok(());
        }
    }
    output::debug(
        format!("{} pending edit(s)", session.edits().len()),
        verbosity,
    );

    let json = opts.json || config.json_output();

    if opts.dry_run {
        let (record, issues) = session.preview(&config.reconcile_options())?;
        if json {
            output::json(&PreviewOutput {
                file: session.path(),
                format: session.format(),
                dry_run: true,
                record: &record,
                issues: &issues,
            })?;
        } else {
            output::data(format_line(session.format(), true));
            output::data(record_table(&record, &issues));
            output::print("Dry run: nothing was written.", verbosity);
        }
        return Ok(());
    }

    let options = SaveOptions {
        reconcile: config.reconcile_options(),
        sync_timestamps: config.sync_timestamps() && !opts.no_sync_times,
        algorithm,
    };
    let report = session
        .save(&options)
        .with_context(|| format!("Failed to save '{}'", file.display()))?;

    for applied in &report.timestamps.applied {
        output::debug(
            format!("set {} time to {}", kind_label(applied.kind), applied.at),
            verbosity,
        );
    }
    for skipped in &report.timestamps.skipped {
        output::warn(
            format!(
                "could not set {} time: {}",
                kind_label(skipped.update.kind),
                skipped.reason
            ),
            verbosity,
        );
    }

    if json {
        output::json(&SaveOutput {
            file: session.path(),
            format: session.format(),
            report: &report,
        })?;
    } else {
        output::data(format_line(session.format(), true));
        output::data(record_table(&report.record, &report.issues));
        output::data(format!(
            "File Hash ({}): {}",
            report.digest.algorithm.label(),
            report.digest.hex
        ));
    }
    Ok(())
}

fn kind_label(kind: TimestampKind) -> &'static str {
    match kind {
        TimestampKind::Modified => "modification",
        TimestampKind::Created => "creation",
    }
}

/// Ask for a value for every property.
///
/// The prompt shows the pending edit if there is one, otherwise the current
/// value. An empty answer keeps it. An unparseable date is reported and
/// ignored so the current value is kept.
pub(crate) fn prompt_edits<R: BufRead, W: Write>(
    session: &mut Session,
    reader: &mut R,
    writer: &mut W,
    verbosity: Verbosity,
) -> Result<()> {
    let current = session
        .record()
        .cloned()
        .unwrap_or_default();

    for property in Property::ALL {
        let shown = session
            .edits()
            .get(property)
            .map(str::to_string)
            .or_else(|| current.get(property).map(ToString::to_string));
        let answer = prompts::input(reader, writer, property.name(), shown.as_deref())?;
        if answer.is_empty() {
            continue;
        }
        if property.is_date() && Timestamp::parse(&answer).is_none() {
            output::warn(
                format!("'{answer}' is not a valid date for {property}; keeping current value"),
                verbosity,
            );
            continue;
        }
        session.set_edit(property.name(), answer)?;
    }
    Ok(())
}
