//! core::types
//!
//! Strong types for the metadata domain.
//!
//! # Types
//!
//! - [`Property`] - One of the thirteen fixed document properties
//! - [`Timestamp`] - Timezone-naive UTC timestamp (`YYYY-MM-DD HH:MM:SS`)
//! - [`Value`] - A property value (text or timestamp)
//!
//! # Validation
//!
//! These types enforce validity at construction time. A property name that
//! is not part of the schema, or a date that does not exist on the calendar,
//! cannot be represented.
//!
//! # Examples
//!
//! ```
//! use docmeta::core::types::{Property, Timestamp};
//!
//! let prop = Property::parse("Last Modified By").unwrap();
//! assert_eq!(prop, Property::LastModifiedBy);
//!
//! let ts = Timestamp::parse("2024-03-01 09:30:00").unwrap();
//! assert_eq!(ts.to_string(), "2024-03-01 09:30:00");
//!
//! assert!(Property::parse("Author").is_err());
//! assert!(Timestamp::parse("2024-02-30 10:00:00").is_none());
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Display and input format for timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Offset-bearing variants of [`TIMESTAMP_FORMAT`] accepted on input.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %:z",
    "%Y-%m-%d %H:%M:%S %z",
];

/// Errors from validating property names and values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid revision '{value}': expected a non-negative integer")]
    InvalidRevision { value: String },

    #[error("invalid date for {property}: '{value}' (expected YYYY-MM-DD HH:MM:SS)")]
    InvalidDate { property: Property, value: String },

    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    #[error("invalid edit '{0}': expected KEY=VALUE")]
    InvalidAssignment(String),

    #[error("{property} expects a {expected} value")]
    WrongValueKind {
        property: Property,
        expected: &'static str,
    },
}

/// A property of the fixed document metadata schema.
///
/// Variants are declared in display order; `Ord` follows that order so
/// ordered maps keyed by `Property` iterate the way the table renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Property {
    Title,
    Subject,
    Creator,
    Keywords,
    Description,
    LastModifiedBy,
    Revision,
    Created,
    Modified,
    Category,
    ContentStatus,
    Language,
    Identifier,
}

impl Property {
    /// Every property, in schema order.
    pub const ALL: [Property; 13] = [
        Property::Title,
        Property::Subject,
        Property::Creator,
        Property::Keywords,
        Property::Description,
        Property::LastModifiedBy,
        Property::Revision,
        Property::Created,
        Property::Modified,
        Property::Category,
        Property::ContentStatus,
        Property::Language,
        Property::Identifier,
    ];

    /// Canonical property name.
    pub fn name(self) -> &'static str {
        match self {
            Property::Title => "Title",
            Property::Subject => "Subject",
            Property::Creator => "Creator",
            Property::Keywords => "Keywords",
            Property::Description => "Description",
            Property::LastModifiedBy => "LastModifiedBy",
            Property::Revision => "Revision",
            Property::Created => "Created",
            Property::Modified => "Modified",
            Property::Category => "Category",
            Property::ContentStatus => "ContentStatus",
            Property::Language => "Language",
            Property::Identifier => "Identifier",
        }
    }

    /// Whether values of this property are timestamps rather than text.
    pub fn is_date(self) -> bool {
        matches!(self, Property::Created | Property::Modified)
    }

    /// Resolve a property from a user-supplied name.
    ///
    /// Matching ignores case, spaces, underscores and hyphens, so
    /// `"Last Modified By"`, `"last_modified_by"` and `"LastModifiedBy"`
    /// all resolve to [`Property::LastModifiedBy`].
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownProperty` for names outside the schema.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        let wanted = fold_name(name);
        Self::ALL
            .into_iter()
            .find(|p| fold_name(p.name()) == wanted)
            .ok_or_else(|| ValidationError::UnknownProperty(name.trim().to_string()))
    }
}

fn fold_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Property {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A calendar timestamp with second precision, normalized to naive UTC.
///
/// Timezone-bearing inputs are converted to their UTC equivalent and the
/// offset is dropped. Sub-second precision is truncated.
///
/// # Example
///
/// ```
/// use docmeta::core::types::Timestamp;
///
/// let ts = Timestamp::parse("2024-06-01 12:00:00+02:00").unwrap();
/// assert_eq!(ts.to_string(), "2024-06-01 10:00:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Wrap a naive UTC datetime, truncating sub-second precision.
    pub fn new(naive: NaiveDateTime) -> Self {
        Self(naive.with_nanosecond(0).unwrap_or(naive))
    }

    /// Parse user input.
    ///
    /// Accepts `YYYY-MM-DD HH:MM:SS`, the same followed by a UTC offset
    /// (`+02:00` or `+0200`), and RFC 3339. Returns `None` for anything else,
    /// including dates that do not exist on the calendar and second 60.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
            return Self::checked(naive);
        }
        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, format) {
                return Self::checked(dt.naive_utc());
            }
        }
        DateTime::parse_from_rfc3339(s)
            .ok()
            .and_then(|dt| Self::checked(dt.naive_utc()))
    }

    /// Like [`Timestamp::new`], but rejects a leap second (`:60`), which
    /// chrono accepts in any minute.
    fn checked(naive: NaiveDateTime) -> Option<Self> {
        (naive.nanosecond() < 1_000_000_000).then(|| Self::new(naive))
    }

    /// Parse a W3C date-time as stored in OOXML core properties.
    ///
    /// Besides full date-times this accepts the date-only form
    /// (`2024-01-31`), interpreted as midnight UTC.
    pub fn from_w3cdtf(input: &str) -> Option<Self> {
        let s = input.trim();
        if let Some(ts) = Self::parse(s) {
            return Some(ts);
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
            return Self::checked(naive);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self::new)
    }

    /// Render as a W3C date-time in UTC (`2024-01-31T08:00:00Z`).
    pub fn to_w3cdtf(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Convert to a `SystemTime` for filesystem calls.
    pub fn to_system_time(&self) -> SystemTime {
        SystemTime::from(Utc.from_utc_datetime(&self.0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.to_string()
    }
}

impl TryFrom<String> for Timestamp {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("invalid timestamp '{s}'"))
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Timestamp(Timestamp),
}

impl Value {
    /// The text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Timestamp(_) => None,
        }
    }

    /// The timestamp, if this is a timestamp value.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            Value::Text(_) => None,
        }
    }

    /// Whether this value fits the property's kind.
    pub fn fits(&self, property: Property) -> bool {
        matches!(self, Value::Timestamp(_)) == property.is_date()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Timestamp(ts) => ts.fmt(f),
        }
    }
}
