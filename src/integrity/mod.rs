//! integrity
//!
//! File digests and filesystem timestamp synchronization.
//!
//! # Modules
//!
//! - [`digest`] - Streaming hex digests over file contents
//! - [`timestamps`] - Planning and applying mtime/creation-time updates
//!
//! Both operate on a path supplied by the caller. Files are opened and
//! closed within a single call; no handle outlives it.

pub mod digest;
pub mod timestamps;

pub use digest::{digest, digest_reader, DigestAlgorithm, CHUNK_SIZE};
pub use timestamps::{
    apply_timestamp_updates, creation_time_supported, plan_timestamp_updates, SkippedUpdate,
    SyncReport, TimestampKind, TimestampUpdate,
};

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from digest and timestamp operations.
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error on '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error(
        "unsupported digest algorithm '{0}' (expected one of: {})",
        DigestAlgorithm::valid_names()
    )]
    UnsupportedAlgorithm(String),
}

impl IntegrityError {
    /// Classify an I/O error for `path`.
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            IntegrityError::FileNotFound(path.to_path_buf())
        } else {
            IntegrityError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}
