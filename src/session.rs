//! session
//!
//! One open document and its pending edits.
//!
//! # Lifecycle
//!
//! [`Session::open`] detects the format, picks an adapter and extracts the
//! current metadata. Edits accumulate in memory until [`Session::save`],
//! which runs in a fixed order:
//!
//! 1. refuse read-only formats
//! 2. reconcile (all validation happens here)
//! 3. write the reconciled record back
//! 4. align filesystem timestamps with Created/Modified
//! 5. digest the saved file
//!
//! A validation failure in step 2 leaves the file byte-for-byte untouched.
//! After step 3 succeeds the session holds the saved record and its edits
//! are cleared, even if a later step fails.
//!
//! The session owns the path, not a file handle. Every step opens and
//! closes the file itself.

use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::core::{
    issues, reconcile_with, Edits, IssueReport, MetadataRecord, Property, ReconcileOptions,
    ValidationError,
};
use crate::formats::{
    DocumentFormat, ExtractedMetadata, FormatAdapter, FormatError, FormatRegistry,
};
use crate::integrity::{
    apply_timestamp_updates, digest, plan_timestamp_updates, DigestAlgorithm, IntegrityError,
    SyncReport,
};

/// Errors surfaced to the user by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{context}")]
    IoFailure {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl From<FormatError> for SessionError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::FileNotFound(path) => SessionError::FileNotFound(path),
            FormatError::UnsupportedFormat(what) => SessionError::UnsupportedFormat(what),
            FormatError::ReadOnly { format } => SessionError::UnsupportedFormat(format!(
                "{format} files are read-only; metadata cannot be saved"
            )),
            FormatError::Validation(e) => SessionError::Validation(e),
            other => SessionError::IoFailure {
                context: "document read/write failed".to_string(),
                source: Box::new(other),
            },
        }
    }
}

impl From<IntegrityError> for SessionError {
    fn from(err: IntegrityError) -> Self {
        match err {
            IntegrityError::FileNotFound(path) => SessionError::FileNotFound(path),
            other => SessionError::IoFailure {
                context: "file integrity operation failed".to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Options for [`Session::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    pub reconcile: ReconcileOptions,
    /// Set filesystem timestamps from Created/Modified after writing.
    pub sync_timestamps: bool,
    pub algorithm: DigestAlgorithm,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            reconcile: ReconcileOptions::default(),
            sync_timestamps: true,
            algorithm: DigestAlgorithm::default(),
        }
    }
}

/// A file digest with the algorithm that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDigest {
    pub algorithm: DigestAlgorithm,
    pub hex: String,
}

/// Outcome of a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub record: MetadataRecord,
    pub issues: IssueReport,
    pub digest: FileDigest,
    pub timestamps: SyncReport,
}

/// An open document.
pub struct Session {
    path: PathBuf,
    format: DocumentFormat,
    adapter: Arc<dyn FormatAdapter>,
    metadata: ExtractedMetadata,
    edits: Edits,
}

impl Session {
    /// Open the document at `path` and extract its metadata.
    ///
    /// # Errors
    ///
    /// - `SessionError::FileNotFound` if nothing exists at `path`
    /// - `SessionError::UnsupportedFormat` if the content is not recognized
    /// - `SessionError::IoFailure` if the document cannot be read
    pub fn open(path: impl AsRef<Path>, registry: &FormatRegistry) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let (format, adapter) = registry.detect(&path)?;
        let metadata = adapter.extract(&path, format)?;
        Ok(Self {
            path,
            format,
            adapter,
            metadata,
            edits: Edits::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Metadata as last extracted or saved.
    pub fn metadata(&self) -> &ExtractedMetadata {
        &self.metadata
    }

    /// The fixed-schema record, or `None` for read-only formats.
    pub fn record(&self) -> Option<&MetadataRecord> {
        self.metadata.as_record()
    }

    pub fn is_writable(&self) -> bool {
        self.record().is_some() && self.adapter.supports_write_back()
    }

    pub fn edits(&self) -> &Edits {
        &self.edits
    }

    /// Stage an edit by property name.
    ///
    /// # Errors
    ///
    /// - `SessionError::UnsupportedFormat` for read-only formats
    /// - `SessionError::Validation` for an unknown property name
    pub fn set_edit(&mut self, property: &str, value: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_writable()?;
        let property = Property::parse(property)?;
        self.edits.insert(property, value);
        Ok(())
    }

    /// Replace all pending edits.
    pub fn set_edits(&mut self, edits: Edits) -> Result<(), SessionError> {
        self.ensure_writable()?;
        self.edits = edits;
        Ok(())
    }

    pub fn clear_edits(&mut self) {
        self.edits = Edits::new();
    }

    /// Issues on the current record; empty for read-only formats.
    pub fn issues(&self) -> IssueReport {
        self.record().map(issues).unwrap_or_default()
    }

    /// Reconcile pending edits without writing anything.
    pub fn preview(
        &self,
        options: &ReconcileOptions,
    ) -> Result<(MetadataRecord, IssueReport), SessionError> {
        let original = self.ensure_writable()?;
        Ok(reconcile_with(original, &self.edits, options)?)
    }

    /// Reconcile, write, sync timestamps and digest.
    ///
    /// # Errors
    ///
    /// - `SessionError::UnsupportedFormat` for read-only formats
    /// - `SessionError::Validation` if reconciliation rejects the edits;
    ///   the file is not touched
    /// - `SessionError::IoFailure` if writing, setting the modification
    ///   time or hashing fails
    pub fn save(&mut self, options: &SaveOptions) -> Result<SaveReport, SessionError> {
        let original = self.ensure_writable()?;
        let (record, issues) = reconcile_with(original, &self.edits, &options.reconcile)?;

        self.adapter.write_back(&self.path, self.format, &record)?;
        self.metadata = ExtractedMetadata::Record(record.clone());
        self.clear_edits();

        let timestamps = if options.sync_timestamps {
            apply_timestamp_updates(&self.path, &plan_timestamp_updates(&record))?
        } else {
            SyncReport::default()
        };

        let digest = self.digest(options.algorithm)?;
        Ok(SaveReport {
            record,
            issues,
            digest,
            timestamps,
        })
    }

    /// Digest the file as it currently is on disk.
    pub fn digest(&self, algorithm: DigestAlgorithm) -> Result<FileDigest, SessionError> {
        let hex = digest(&self.path, algorithm)?;
        Ok(FileDigest { algorithm, hex })
    }

    fn ensure_writable(&self) -> Result<&MetadataRecord, SessionError> {
        match self.metadata.as_record() {
            Some(record) if self.adapter.supports_write_back() => Ok(record),
            _ => Err(FormatError::ReadOnly {
                format: self.format,
            }
            .into()),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("adapter", &self.adapter.name())
            .field("edits", &self.edits)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const CORE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>Budget</dc:title><dc:creator>Grace</dc:creator><cp:revision>4</cp:revision><dcterms:modified xsi:type="dcterms:W3CDTF">2023-06-30T17:45:00Z</dcterms:modified></cp:coreProperties>"#;

    fn write_xlsx(path: &Path, core_xml: &str) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(b"<workbook/>").unwrap();
        zip.start_file("docProps/core.xml", options).unwrap();
        zip.write_all(core_xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    fn open_fixture(temp: &TempDir) -> (PathBuf, Session) {
        let path = temp.path().join("book.xlsx");
        write_xlsx(&path, CORE_XML);
        let session = Session::open(&path, &FormatRegistry::with_defaults()).unwrap();
        (path, session)
    }

    #[test]
    fn open_extracts_record() {
        let temp = TempDir::new().unwrap();
        let (_, session) = open_fixture(&temp);
        assert_eq!(session.format(), DocumentFormat::Xlsx);
        let record = session.record().unwrap();
        assert_eq!(record.text(Property::Title), Some("Budget"));
        assert_eq!(record.text(Property::Revision), Some("4"));
        assert!(session.issues().is_empty());
        assert!(session.is_writable());
    }

    #[test]
    fn open_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = Session::open(temp.path().join("gone.docx"), &FormatRegistry::with_defaults())
            .unwrap_err();
        assert!(matches!(err, SessionError::FileNotFound(_)));
    }

    #[test]
    fn open_unknown_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, "plain").unwrap();
        let err = Session::open(&path, &FormatRegistry::with_defaults()).unwrap_err();
        assert!(matches!(err, SessionError::UnsupportedFormat(_)));
    }

    #[test]
    fn set_edit_rejects_unknown_property() {
        let temp = TempDir::new().unwrap();
        let (_, mut session) = open_fixture(&temp);
        let err = session.set_edit("Colour", "blue").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::UnknownProperty(_))
        ));
    }

    #[test]
    fn preview_does_not_write() {
        let temp = TempDir::new().unwrap();
        let (path, mut session) = open_fixture(&temp);
        let before = fs::read(&path).unwrap();

        session.set_edit("title", "Forecast").unwrap();
        let (record, _) = session.preview(&ReconcileOptions::default()).unwrap();
        assert_eq!(record.text(Property::Title), Some("Forecast"));
        assert_eq!(record.text(Property::Revision), Some("5"));
        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(session.edits().len(), 1);
    }

    #[test]
    fn save_round_trips() {
        let temp = TempDir::new().unwrap();
        let (path, mut session) = open_fixture(&temp);
        session.set_edit("Subject", "Finance").unwrap();
        session.set_edit("Modified", "2024-05-06 07:08:09").unwrap();

        let report = session.save(&SaveOptions::default()).unwrap();
        assert_eq!(report.record.text(Property::Subject), Some("Finance"));
        assert_eq!(report.record.text(Property::Revision), Some("5"));
        assert_eq!(report.digest.hex.len(), 64);
        assert!(session.edits().is_empty());

        let reopened = Session::open(&path, &FormatRegistry::with_defaults()).unwrap();
        assert_eq!(reopened.record(), Some(&report.record));
        assert_eq!(
            report.digest,
            reopened.digest(DigestAlgorithm::Sha256).unwrap()
        );
    }

    #[test]
    fn invalid_date_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let (path, mut session) = open_fixture(&temp);
        let before = fs::read(&path).unwrap();

        session.set_edit("Modified", "2024-02-30 10:00:00").unwrap();
        let err = session.save(&SaveOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::InvalidDate { .. })
        ));
        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(session.edits().len(), 1);
    }

    #[test]
    fn invalid_revision_blocks_save() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("book.xlsx");
        write_xlsx(&path, &CORE_XML.replace(">4<", ">draft<"));
        let mut session = Session::open(&path, &FormatRegistry::with_defaults()).unwrap();
        assert!(session.issues().contains(Property::Revision));

        let err = session.save(&SaveOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::InvalidRevision { .. })
        ));
    }

    #[test]
    fn save_syncs_modification_time() {
        let temp = TempDir::new().unwrap();
        let (path, mut session) = open_fixture(&temp);
        session.set_edit("Modified", "2021-03-04 05:06:07").unwrap();

        let report = session.save(&SaveOptions::default()).unwrap();
        let modified = fs::metadata(&path).unwrap().modified().unwrap();
        let expected = report
            .record
            .timestamp(Property::Modified)
            .unwrap()
            .to_system_time();
        assert_eq!(modified, expected);
    }

    #[test]
    fn read_only_format_refuses_edits() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("photo.gif");
        fs::write(&path, b"GIF89a\x01\x00\x01\x00").unwrap();
        let mut session = Session::open(&path, &FormatRegistry::with_defaults()).unwrap();

        assert!(!session.is_writable());
        assert!(session.issues().is_empty());
        assert!(matches!(
            session.set_edit("Title", "x"),
            Err(SessionError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            session.save(&SaveOptions::default()),
            Err(SessionError::UnsupportedFormat(_))
        ));
    }
}
