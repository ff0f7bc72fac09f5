//! core::reconcile
//!
//! Merge an extracted record with user edits under validation rules.
//!
//! # Rules
//!
//! For each property the merged value is the edit when present and
//! non-blank, otherwise the original value. Then:
//!
//! - **Revision**: when present, must be a non-negative integer. It is
//!   incremented by one (unless disabled by [`ReconcileOptions`]) and stored
//!   back as a string. A non-numeric revision is an error, never a silent
//!   default.
//! - **Created / Modified**: an edited value is parsed as
//!   `YYYY-MM-DD HH:MM:SS`; offset-bearing input is normalized to naive UTC.
//!   Unparseable values, including impossible calendar dates, are errors.
//!
//! Reconciliation is pure. It reads its inputs, returns a new record and
//! an issue report, and performs no I/O. Callers validate first and write
//! only when reconciliation succeeds.
//!
//! # Example
//!
//! ```
//! use docmeta::core::{reconcile, Edits, MetadataRecord, Property};
//!
//! let original = MetadataRecord::new()
//!     .with_text(Property::Creator, "Ada").unwrap()
//!     .with_text(Property::Revision, "4").unwrap();
//!
//! let edits = Edits::new().with(Property::Title, "Q3 numbers");
//! let (record, issues) = reconcile(&original, &edits).unwrap();
//!
//! assert_eq!(record.text(Property::Title), Some("Q3 numbers"));
//! assert_eq!(record.text(Property::Revision), Some("5"));
//! assert!(issues.is_empty());
//! ```

use super::issues::{is_valid_revision, issues, IssueReport};
use super::record::{Edits, MetadataRecord};
use super::types::{Property, Timestamp, ValidationError, Value};

/// Tunables for [`reconcile_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Increment the revision on every reconcile.
    pub increment_revision: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            increment_revision: true,
        }
    }
}

/// Reconcile with default options.
///
/// # Errors
///
/// See [`reconcile_with`].
pub fn reconcile(
    original: &MetadataRecord,
    edits: &Edits,
) -> Result<(MetadataRecord, IssueReport), ValidationError> {
    reconcile_with(original, edits, &ReconcileOptions::default())
}

/// Produce the record to persist from an original record and user edits.
///
/// # Errors
///
/// - `ValidationError::InvalidDate` if an edited Created/Modified value does
///   not parse.
/// - `ValidationError::InvalidRevision` if the merged Revision is not a
///   non-negative integer (or would overflow when incremented).
pub fn reconcile_with(
    original: &MetadataRecord,
    edits: &Edits,
    options: &ReconcileOptions,
) -> Result<(MetadataRecord, IssueReport), ValidationError> {
    let mut merged = MetadataRecord::new();

    for property in Property::ALL {
        let edited = edits
            .get(property)
            .map(str::trim)
            .filter(|raw| !raw.is_empty());

        let value = match edited {
            Some(raw) if property.is_date() => Some(Value::Timestamp(parse_date(property, raw)?)),
            Some(raw) => Some(Value::Text(raw.to_string())),
            None => original.get(property).cloned(),
        };
        merged.set(property, value)?;
    }

    if let Some(raw) = merged.text(Property::Revision) {
        let revision = parse_revision(raw)?;
        if options.increment_revision {
            let next = revision
                .checked_add(1)
                .ok_or_else(|| ValidationError::InvalidRevision {
                    value: raw.to_string(),
                })?;
            merged.set_text(Property::Revision, next.to_string())?;
        }
    }

    let report = issues(&merged);
    Ok((merged, report))
}

fn parse_date(property: Property, raw: &str) -> Result<Timestamp, ValidationError> {
    Timestamp::parse(raw).ok_or_else(|| ValidationError::InvalidDate {
        property,
        value: raw.to_string(),
    })
}

fn parse_revision(raw: &str) -> Result<u64, ValidationError> {
    let trimmed = raw.trim();
    let invalid = || ValidationError::InvalidRevision {
        value: raw.to_string(),
    };
    if !is_valid_revision(trimmed) {
        return Err(invalid());
    }
    trimmed.parse::<u64>().map_err(|_| invalid())
}
