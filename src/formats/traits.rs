//! formats::traits
//!
//! Adapter trait and shared types for document formats.
//!
//! # Design
//!
//! An adapter is a thin pass-through to a format library. It extracts
//! metadata and, where the format supports it, writes a reconciled record
//! back. Adapters never reconcile or validate; that happens in
//! [`crate::core::reconcile`] before `write_back` is called.
//!
//! Read-only formats return [`ExtractedMetadata::Opaque`]: a key/value
//! listing shown as-is, not mapped onto the fixed property schema.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::detect::DocumentFormat;
use crate::core::{MetadataRecord, ValidationError};

/// Errors from format detection, extraction and write-back.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("{format} files are read-only; saving metadata is not supported")]
    ReadOnly { format: DocumentFormat },

    #[error("malformed {format} document: {message}")]
    Malformed {
        format: DocumentFormat,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("EXIF error: {0}")]
    Exif(#[from] exif::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// One key/value pair from a read-only format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpaqueEntry {
    pub key: String,
    pub value: String,
}

/// Metadata from a read-only format, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OpaqueMetadata {
    entries: Vec<OpaqueEntry>,
}

impl OpaqueMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(OpaqueEntry {
            key: key.into(),
            value: value.into(),
        });
    }

    /// First value recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    pub fn entries(&self) -> &[OpaqueEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// What an adapter extracted from a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractedMetadata {
    /// Fixed-schema record; eligible for reconciliation.
    Record(MetadataRecord),
    /// Opaque listing from a read-only format.
    Opaque(OpaqueMetadata),
}

impl ExtractedMetadata {
    pub fn as_record(&self) -> Option<&MetadataRecord> {
        match self {
            ExtractedMetadata::Record(r) => Some(r),
            ExtractedMetadata::Opaque(_) => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&OpaqueMetadata> {
        match self {
            ExtractedMetadata::Opaque(o) => Some(o),
            ExtractedMetadata::Record(_) => None,
        }
    }
}

/// A document format backend.
///
/// Implementations must be stateless between calls: a path goes in, the
/// file is opened, read or rewritten, and closed before returning.
pub trait FormatAdapter: Send + Sync {
    /// Short adapter name for diagnostics.
    fn name(&self) -> &'static str;

    /// Formats this adapter handles.
    fn formats(&self) -> &'static [DocumentFormat];

    /// Extract metadata from a document of the given format.
    fn extract(&self, path: &Path, format: DocumentFormat)
        -> Result<ExtractedMetadata, FormatError>;

    /// Whether [`write_back`](Self::write_back) is supported.
    fn supports_write_back(&self) -> bool {
        false
    }

    /// Persist a reconciled record into the document at `path`.
    ///
    /// Implementations must leave the original file intact on failure.
    fn write_back(
        &self,
        _path: &Path,
        format: DocumentFormat,
        _record: &MetadataRecord,
    ) -> Result<(), FormatError> {
        Err(FormatError::ReadOnly { format })
    }
}
