//! integrity::timestamps
//!
//! Align filesystem timestamps with a record's Created/Modified values.
//!
//! # Platform support
//!
//! Modification time can be set everywhere; access time is set to the same
//! value. Creation time can only be set on Windows and macOS. Elsewhere it
//! is left out of the plan, and a creation update applied anyway is
//! reported as skipped rather than failing.

use std::io;
use std::path::Path;

use filetime::{set_file_times, FileTime};
use serde::Serialize;

use super::IntegrityError;
use crate::core::{MetadataRecord, Property, Timestamp};

/// Which filesystem timestamp an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampKind {
    Modified,
    Created,
}

/// A single filesystem timestamp change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimestampUpdate {
    pub kind: TimestampKind,
    pub at: Timestamp,
}

/// An update that was not applied, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedUpdate {
    pub update: TimestampUpdate,
    pub reason: String,
}

/// Outcome of applying a set of updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub applied: Vec<TimestampUpdate>,
    pub skipped: Vec<SkippedUpdate>,
}

/// Whether this platform can set a file's creation time.
pub fn creation_time_supported() -> bool {
    cfg!(any(windows, target_os = "macos"))
}

/// Plan the timestamp updates implied by a record.
///
/// Modified always produces an update when present. Created produces one
/// only where [`creation_time_supported`] holds.
pub fn plan_timestamp_updates(record: &MetadataRecord) -> Vec<TimestampUpdate> {
    let mut plan = Vec::new();
    if let Some(at) = record.timestamp(Property::Modified) {
        plan.push(TimestampUpdate {
            kind: TimestampKind::Modified,
            at,
        });
    }
    if creation_time_supported() {
        if let Some(at) = record.timestamp(Property::Created) {
            plan.push(TimestampUpdate {
                kind: TimestampKind::Created,
                at,
            });
        }
    }
    plan
}

/// Apply planned updates to a file.
///
/// # Errors
///
/// Returns `IntegrityError` if a modification-time update fails. Creation
/// time is best-effort: failures land in [`SyncReport::skipped`].
pub fn apply_timestamp_updates(
    path: &Path,
    updates: &[TimestampUpdate],
) -> Result<SyncReport, IntegrityError> {
    let mut report = SyncReport::default();
    for update in updates {
        match update.kind {
            TimestampKind::Modified => {
                set_modified(path, update.at).map_err(|e| IntegrityError::from_io(path, e))?;
                report.applied.push(*update);
            }
            TimestampKind::Created => match set_created(path, update.at) {
                Ok(()) => report.applied.push(*update),
                Err(e) => report.skipped.push(SkippedUpdate {
                    update: *update,
                    reason: e.to_string(),
                }),
            },
        }
    }
    Ok(report)
}

fn set_modified(path: &Path, at: Timestamp) -> io::Result<()> {
    let time = FileTime::from_system_time(at.to_system_time());
    set_file_times(path, time, time)
}

#[cfg(any(windows, target_os = "macos"))]
fn set_created(path: &Path, at: Timestamp) -> io::Result<()> {
    use std::fs::{FileTimes, OpenOptions};
    #[cfg(target_os = "macos")]
    use std::os::macos::fs::FileTimesExt;
    #[cfg(windows)]
    use std::os::windows::fs::FileTimesExt;

    let file = OpenOptions::new().write(true).open(path)?;
    file.set_times(FileTimes::new().set_created(at.to_system_time()))
}

#[cfg(not(any(windows, target_os = "macos")))]
fn set_created(_path: &Path, _at: Timestamp) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "setting creation time is not supported on this platform",
    ))
}
