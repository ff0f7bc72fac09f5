//! Property-based tests for core domain types.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use docmeta::core::{
    issues, reconcile, Edits, Issue, MetadataRecord, Property, Timestamp, ValidationError,
};

/// Strategy for any property in the schema.
fn any_property() -> impl Strategy<Value = Property> {
    prop::sample::select(Property::ALL.to_vec())
}

/// Strategy for valid calendar datetimes between 1970 and 2099.
fn valid_datetime() -> impl Strategy<Value = NaiveDateTime> {
    (1970i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(y, mo, d, h, mi, s)| {
            NaiveDate::from_ymd_opt(y, mo, d)
                .and_then(|date| date.and_hms_opt(h, mi, s))
                .unwrap()
        },
    )
}

/// Strategy for non-blank free text.
fn non_blank_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 ,.]{0,30}"
}

/// A record with a valid creator and the given revision.
fn base_record(revision: &str) -> MetadataRecord {
    MetadataRecord::new()
        .with_text(Property::Title, "Plan")
        .unwrap()
        .with_text(Property::Creator, "Grace")
        .unwrap()
        .with_text(Property::Revision, revision)
        .unwrap()
        .with_timestamp(
            Property::Modified,
            Timestamp::parse("2023-06-30 17:45:00").unwrap(),
        )
        .unwrap()
}

proptest! {
    /// Saving always moves a numeric revision forward by exactly one.
    #[test]
    fn revision_increments_by_one(n in 0u64..u64::MAX) {
        let original = base_record(&n.to_string());
        let (merged, report) = reconcile(&original, &Edits::new()).unwrap();
        let expected = (n + 1).to_string();
        prop_assert_eq!(merged.text(Property::Revision), Some(expected.as_str()));
        prop_assert!(!report.contains(Property::Revision));
    }

    /// An edited revision is the base for the increment.
    #[test]
    fn edited_revision_is_incremented(n in 0u64..1_000_000) {
        let original = base_record("7");
        let edits = Edits::new().with(Property::Revision, n.to_string());
        let (merged, _) = reconcile(&original, &edits).unwrap();
        let expected = (n + 1).to_string();
        prop_assert_eq!(merged.text(Property::Revision), Some(expected.as_str()));
    }

    /// Revisions containing anything but digits never reconcile.
    #[test]
    fn non_numeric_revision_rejected(raw in "[0-9]{0,3}[a-z.-][0-9a-z]{0,3}") {
        let original = base_record(&raw);
        let result = reconcile(&original, &Edits::new());
        let is_invalid_revision = matches!(result, Err(ValidationError::InvalidRevision { .. }));
        prop_assert!(is_invalid_revision);
    }

    /// Canonical date strings survive a display/parse cycle.
    #[test]
    fn timestamp_display_parse_cycle(dt in valid_datetime()) {
        let ts = Timestamp::new(dt);
        prop_assert_eq!(Timestamp::parse(&ts.to_string()), Some(ts));
        prop_assert_eq!(Timestamp::from_w3cdtf(&ts.to_w3cdtf()), Some(ts));
    }

    /// Date edits land in the record as parsed timestamps.
    #[test]
    fn date_edits_are_parsed(dt in valid_datetime()) {
        let ts = Timestamp::new(dt);
        let edits = Edits::new().with(Property::Created, ts.to_string());
        let (merged, _) = reconcile(&base_record("1"), &edits).unwrap();
        prop_assert_eq!(merged.timestamp(Property::Created), Some(ts));
    }

    /// A creator with visible characters is never flagged.
    #[test]
    fn present_creator_not_flagged(creator in non_blank_text()) {
        let record = base_record("1").with_text(Property::Creator, creator).unwrap();
        prop_assert!(!issues(&record).contains(Property::Creator));
    }

    /// A whitespace-only creator is always flagged.
    #[test]
    fn blank_creator_flagged(creator in "[ \t]{0,8}") {
        let record = base_record("1").with_text(Property::Creator, creator).unwrap();
        prop_assert_eq!(issues(&record).get(Property::Creator), Some(Issue::MissingCreator));
    }

    /// Blank edits never replace an existing value.
    #[test]
    fn blank_edit_keeps_original(property in any_property(), blank in "[ \t]{0,5}") {
        let original = base_record("3");
        let edits = Edits::new().with(property, blank);
        let (merged, _) = reconcile(&original, &edits).unwrap();
        for (p, value) in merged.iter() {
            if p != Property::Revision {
                prop_assert_eq!(value, original.get(p));
            }
        }
    }

    /// Non-blank text edits win over the original value.
    #[test]
    fn text_edit_wins(text in non_blank_text()) {
        let edits = Edits::new().with(Property::Subject, text.clone());
        let (merged, _) = reconcile(&base_record("3"), &edits).unwrap();
        prop_assert_eq!(merged.text(Property::Subject), Some(text.trim()));
    }

    /// Property names resolve regardless of case and separators.
    #[test]
    fn property_names_fold(property in any_property(), upper in any::<bool>(), sep in "[ _-]?") {
        let name = property.name();
        let mut variant = String::new();
        for (i, c) in name.chars().enumerate() {
            if i > 0 && c.is_ascii_uppercase() {
                variant.push_str(&sep);
            }
            variant.push(c);
        }
        let variant = if upper { variant.to_uppercase() } else { variant.to_lowercase() };
        prop_assert_eq!(Property::parse(&variant).unwrap(), property);
    }

    /// Assignments split on the first '='.
    #[test]
    fn assignment_keeps_value_verbatim(property in any_property(), value in "[a-z=]{0,12}") {
        let (parsed, raw) = Edits::parse_assignment(&format!("{}={}", property.name(), value)).unwrap();
        prop_assert_eq!(parsed, property);
        prop_assert_eq!(raw, value);
    }
}
