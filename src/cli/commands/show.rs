//! show command - Display a document's metadata and issues

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::cli::Context;
use crate::core::{IssueReport, MetadataRecord};
use crate::formats::{DocumentFormat, ExtractedMetadata, FormatRegistry, OpaqueMetadata};
use crate::session::Session;
use crate::ui::output;
use crate::ui::table::Table;

#[derive(Serialize)]
struct ShowOutput<'a> {
    file: &'a Path,
    format: DocumentFormat,
    writable: bool,
    metadata: &'a ExtractedMetadata,
    issues: IssueReport,
}

/// Display a document's metadata.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `file` - Document to inspect
/// * `json` - Print JSON instead of a table
pub fn show(ctx: &Context, file: &Path, json: bool) -> Result<()> {
    let config = ctx.load_config()?;
    let verbosity = ctx.verbosity();

    let session = Session::open(file, &FormatRegistry::with_defaults())
        .with_context(|| format!("Failed to open '{}'", file.display()))?;
    output::debug(
        format!("detected {} ({})", session.format(), session.format().description()),
        verbosity,
    );

    if json || config.json_output() {
        output::json(&ShowOutput {
            file: session.path(),
            format: session.format(),
            writable: session.is_writable(),
            metadata: session.metadata(),
            issues: session.issues(),
        })?;
        return Ok(());
    }

    output::data(format_line(session.format(), session.is_writable()));
    let table = match session.metadata() {
        ExtractedMetadata::Record(record) => record_table(record, &session.issues()),
        ExtractedMetadata::Opaque(opaque) => opaque_table(opaque),
    };
    if table.is_empty() {
        output::print("(no metadata found)", verbosity);
    } else {
        output::data(table);
    }
    Ok(())
}

pub(crate) fn format_line(format: DocumentFormat, writable: bool) -> String {
    let access = if writable { "" } else { ", read-only" };
    format!("Format: {} ({}{})", format.description(), format, access)
}

/// Property/Value/Issues table over the full schema.
pub(crate) fn record_table(record: &MetadataRecord, issues: &IssueReport) -> Table {
    let mut table = Table::new(["Property", "Value", "Issues"]);
    for (property, value) in record.iter() {
        table.row([
            property.name().to_string(),
            value.map(ToString::to_string).unwrap_or_default(),
            issues
                .get(property)
                .map(|issue| issue.message().to_string())
                .unwrap_or_default(),
        ]);
    }
    table
}

pub(crate) fn opaque_table(opaque: &OpaqueMetadata) -> Table {
    let mut table = Table::new(["Key", "Value"]);
    for entry in opaque.entries() {
        table.row([entry.key.as_str(), entry.value.as_str()]);
    }
    table
}
