//! core::record
//!
//! The fixed-schema metadata record and the edit set applied to it.
//!
//! # Invariants
//!
//! - A [`MetadataRecord`] always exposes exactly the thirteen schema
//!   properties; absent values read as `None`.
//! - Date properties only ever hold [`Value::Timestamp`], text properties
//!   only ever hold [`Value::Text`].
//! - [`Edits`] are keyed by [`Property`], so an edit for a name outside the
//!   schema is rejected when the edit set is built.

use std::collections::{BTreeMap, HashMap};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::types::{Property, Timestamp, ValidationError, Value};

/// Document metadata keyed by the fixed property schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    values: BTreeMap<Property, Value>,
}

impl MetadataRecord {
    /// Create a record with every property absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a property value.
    pub fn get(&self, property: Property) -> Option<&Value> {
        self.values.get(&property)
    }

    /// Get a text property value.
    pub fn text(&self, property: Property) -> Option<&str> {
        self.values.get(&property).and_then(Value::as_text)
    }

    /// Get a date property value.
    pub fn timestamp(&self, property: Property) -> Option<Timestamp> {
        self.values.get(&property).and_then(Value::as_timestamp)
    }

    /// Set or clear a property value.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::WrongValueKind` if the value kind does not
    /// match the property (text on a date property or vice versa).
    pub fn set(&mut self, property: Property, value: Option<Value>) -> Result<(), ValidationError> {
        match value {
            Some(value) if !value.fits(property) => Err(ValidationError::WrongValueKind {
                property,
                expected: if property.is_date() {
                    "timestamp"
                } else {
                    "text"
                },
            }),
            Some(value) => {
                self.values.insert(property, value);
                Ok(())
            }
            None => {
                self.values.remove(&property);
                Ok(())
            }
        }
    }

    /// Set a text property.
    pub fn set_text(
        &mut self,
        property: Property,
        text: impl Into<String>,
    ) -> Result<(), ValidationError> {
        self.set(property, Some(Value::Text(text.into())))
    }

    /// Set a date property.
    pub fn set_timestamp(
        &mut self,
        property: Property,
        timestamp: Timestamp,
    ) -> Result<(), ValidationError> {
        self.set(property, Some(Value::Timestamp(timestamp)))
    }

    /// Builder-style [`set_text`](Self::set_text).
    pub fn with_text(
        mut self,
        property: Property,
        text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        self.set_text(property, text)?;
        Ok(self)
    }

    /// Builder-style [`set_timestamp`](Self::set_timestamp).
    pub fn with_timestamp(
        mut self,
        property: Property,
        timestamp: Timestamp,
    ) -> Result<Self, ValidationError> {
        self.set_timestamp(property, timestamp)?;
        Ok(self)
    }

    /// Iterate every schema property with its value, in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (Property, Option<&Value>)> + '_ {
        Property::ALL.into_iter().map(move |p| (p, self.values.get(&p)))
    }

    /// Number of properties that have a value.
    pub fn present_count(&self) -> usize {
        self.values.len()
    }
}

impl Serialize for MetadataRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Property::ALL.len()))?;
        for (property, value) in self.iter() {
            map.serialize_entry(property.name(), &value)?;
        }
        map.end()
    }
}

/// Raw user edits keyed by property.
///
/// Values are kept exactly as entered; interpretation (trimming, date
/// parsing, revision handling) happens in [`crate::core::reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edits(BTreeMap<Property, String>);

impl Edits {
    /// Create an empty edit set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit, replacing any earlier edit of the same property.
    pub fn insert(&mut self, property: Property, value: impl Into<String>) {
        self.0.insert(property, value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, property: Property, value: impl Into<String>) -> Self {
        self.insert(property, value);
        self
    }

    /// Get the raw edit for a property.
    pub fn get(&self, property: Property) -> Option<&str> {
        self.0.get(&property).map(String::as_str)
    }

    /// Whether there are no edits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of edited properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate edits in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (Property, &str)> + '_ {
        self.0.iter().map(|(p, v)| (*p, v.as_str()))
    }

    /// Parse a single `KEY=VALUE` assignment.
    ///
    /// Only the first `=` separates key from value, so values may contain `=`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAssignment` if there is no `=`, or `UnknownProperty`
    /// if the key is not a schema property.
    pub fn parse_assignment(assignment: &str) -> Result<(Property, String), ValidationError> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| ValidationError::InvalidAssignment(assignment.to_string()))?;
        Ok((Property::parse(key)?, value.to_string()))
    }

    /// Build an edit set from `KEY=VALUE` assignments.
    ///
    /// # Example
    ///
    /// ```
    /// use docmeta::core::{Edits, Property};
    ///
    /// let edits = Edits::from_assignments(["Title=Budget", "Last Modified By=Ada"]).unwrap();
    /// assert_eq!(edits.get(Property::Title), Some("Budget"));
    /// assert_eq!(edits.get(Property::LastModifiedBy), Some("Ada"));
    /// ```
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut edits = Self::new();
        for assignment in assignments {
            let (property, value) = Self::parse_assignment(assignment.as_ref())?;
            edits.insert(property, value);
        }
        Ok(edits)
    }
}

impl TryFrom<HashMap<String, String>> for Edits {
    type Error = ValidationError;

    fn try_from(raw: HashMap<String, String>) -> Result<Self, Self::Error> {
        let mut edits = Self::new();
        for (key, value) in raw {
            edits.insert(Property::parse(&key)?, value);
        }
        Ok(edits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn new_record_exposes_full_schema() {
        let record = MetadataRecord::new();
        let keys: Vec<_> = record.iter().map(|(p, _)| p).collect();
        assert_eq!(keys, Property::ALL.to_vec());
        assert!(record.iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn set_and_clear() {
        let mut record = MetadataRecord::new();
        record.set_text(Property::Title, "Report").unwrap();
        assert_eq!(record.text(Property::Title), Some("Report"));
        assert_eq!(record.present_count(), 1);

        record.set(Property::Title, None).unwrap();
        assert_eq!(record.get(Property::Title), None);
        assert_eq!(record.present_count(), 0);
    }

    #[test]
    fn wrong_value_kind_rejected() {
        let mut record = MetadataRecord::new();
        assert!(matches!(
            record.set_text(Property::Created, "2024-01-01 00:00:00"),
            Err(ValidationError::WrongValueKind {
                property: Property::Created,
                ..
            })
        ));
        assert!(record
            .set_timestamp(Property::Title, ts("2024-01-01 00:00:00"))
            .is_err());
    }

    #[test]
    fn serializes_every_key_in_order() {
        let record = MetadataRecord::new()
            .with_text(Property::Creator, "Ada")
            .unwrap()
            .with_timestamp(Property::Modified, ts("2024-05-06 07:08:09"))
            .unwrap();
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 13);
        assert_eq!(obj["Creator"], "Ada");
        assert_eq!(obj["Modified"], "2024-05-06 07:08:09");
        assert!(obj["Title"].is_null());
    }

    #[test]
    fn assignment_splits_on_first_equals() {
        let (p, v) = Edits::parse_assignment("Keywords=a=b").unwrap();
        assert_eq!(p, Property::Keywords);
        assert_eq!(v, "a=b");
    }

    #[test]
    fn assignment_without_equals_rejected() {
        assert_eq!(
            Edits::parse_assignment("Title"),
            Err(ValidationError::InvalidAssignment("Title".into()))
        );
    }

    #[test]
    fn assignment_unknown_key_rejected() {
        assert!(matches!(
            Edits::from_assignments(["Author=Ada"]),
            Err(ValidationError::UnknownProperty(_))
        ));
    }

    #[test]
    fn later_edit_wins() {
        let edits = Edits::from_assignments(["Title=one", "title=two"]).unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits.get(Property::Title), Some("two"));
    }

    #[test]
    fn from_hash_map() {
        let mut raw = HashMap::new();
        raw.insert("Modified".to_string(), "2024-01-01 00:00:00".to_string());
        let edits = Edits::try_from(raw).unwrap();
        assert_eq!(edits.get(Property::Modified), Some("2024-01-01 00:00:00"));
    }
}
