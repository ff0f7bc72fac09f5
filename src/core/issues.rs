//! core::issues
//!
//! Validation of a metadata record against fixed rules.
//!
//! # Rules
//!
//! - Creator must be present and non-blank.
//! - Revision must be present and consist only of ASCII digits.
//!
//! The report is computed independently of reconciliation; it describes a
//! record, it never changes one.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::record::MetadataRecord;
use super::types::Property;

/// A problem found on a single property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Issue {
    /// Creator is absent or blank.
    MissingCreator,
    /// Revision is absent or not a non-negative integer.
    InvalidRevision,
}

impl Issue {
    /// Human-readable diagnostic.
    pub fn message(self) -> &'static str {
        match self {
            Issue::MissingCreator => "Missing creator",
            Issue::InvalidRevision => "Invalid revision number",
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Diagnostics keyed by property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueReport(BTreeMap<Property, Issue>);

impl IssueReport {
    /// Get the issue for a property.
    pub fn get(&self, property: Property) -> Option<Issue> {
        self.0.get(&property).copied()
    }

    /// Whether the property has an issue.
    pub fn contains(&self, property: Property) -> bool {
        self.0.contains_key(&property)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate issues in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (Property, Issue)> + '_ {
        self.0.iter().map(|(p, i)| (*p, *i))
    }
}

impl Serialize for IssueReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (property, issue) in self.iter() {
            map.serialize_entry(property.name(), issue.message())?;
        }
        map.end()
    }
}

/// Whether a revision string is a non-negative integer.
pub fn is_valid_revision(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Validate a record and report problems.
pub fn issues(record: &MetadataRecord) -> IssueReport {
    let mut report = BTreeMap::new();

    let creator = record.text(Property::Creator).map(str::trim);
    if creator.map_or(true, str::is_empty) {
        report.insert(Property::Creator, Issue::MissingCreator);
    }

    if !record.text(Property::Revision).is_some_and(is_valid_revision) {
        report.insert(Property::Revision, Issue::InvalidRevision);
    }

    IssueReport(report)
}
