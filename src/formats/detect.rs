//! formats::detect
//!
//! Content-based format detection.
//!
//! # Strategy
//!
//! 1. Sniff magic bytes with `infer`.
//! 2. OOXML documents are ZIP containers; when `infer` only reports a
//!    generic ZIP, the archive is probed for `xl/` or `word/` parts.
//! 3. Only when the content carries no recognizable signature at all is
//!    the file extension consulted. Recognized content always wins: a
//!    spreadsheet renamed to `.pdf` is still a spreadsheet.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Serialize;
use zip::ZipArchive;

use super::traits::FormatError;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Broad document family, shown in format listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatFamily {
    Spreadsheet,
    WordProcessor,
    Pdf,
    Image,
}

/// A supported document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Xlsx,
    Docx,
    Pdf,
    Jpeg,
    Png,
    Gif,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 6] = [
        DocumentFormat::Xlsx,
        DocumentFormat::Docx,
        DocumentFormat::Pdf,
        DocumentFormat::Jpeg,
        DocumentFormat::Png,
        DocumentFormat::Gif,
    ];

    /// Short identifier.
    pub fn name(self) -> &'static str {
        match self {
            DocumentFormat::Xlsx => "xlsx",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Jpeg => "jpeg",
            DocumentFormat::Png => "png",
            DocumentFormat::Gif => "gif",
        }
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            DocumentFormat::Xlsx => "Excel spreadsheet",
            DocumentFormat::Docx => "Word document",
            DocumentFormat::Pdf => "PDF document",
            DocumentFormat::Jpeg => "JPEG image",
            DocumentFormat::Png => "PNG image",
            DocumentFormat::Gif => "GIF image",
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Jpeg => "jpg",
            other => other.name(),
        }
    }

    pub fn family(self) -> FormatFamily {
        match self {
            DocumentFormat::Xlsx => FormatFamily::Spreadsheet,
            DocumentFormat::Docx => FormatFamily::WordProcessor,
            DocumentFormat::Pdf => FormatFamily::Pdf,
            DocumentFormat::Jpeg | DocumentFormat::Png | DocumentFormat::Gif => {
                FormatFamily::Image
            }
        }
    }

    /// Map a MIME type reported by content sniffing.
    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            XLSX_MIME => Some(DocumentFormat::Xlsx),
            DOCX_MIME => Some(DocumentFormat::Docx),
            "application/pdf" => Some(DocumentFormat::Pdf),
            "image/jpeg" => Some(DocumentFormat::Jpeg),
            "image/png" => Some(DocumentFormat::Png),
            "image/gif" => Some(DocumentFormat::Gif),
            _ => None,
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(DocumentFormat::Xlsx),
            "docx" => Some(DocumentFormat::Docx),
            "pdf" => Some(DocumentFormat::Pdf),
            "jpg" | "jpeg" => Some(DocumentFormat::Jpeg),
            "png" => Some(DocumentFormat::Png),
            "gif" => Some(DocumentFormat::Gif),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detect the format of the file at `path` from its contents.
///
/// # Errors
///
/// - `FormatError::FileNotFound` if nothing exists at `path`
/// - `FormatError::UnsupportedFormat` if the content is not recognized
/// - `FormatError::Io` if the file cannot be read
pub fn detect_format(path: &Path) -> Result<DocumentFormat, FormatError> {
    if !path.exists() {
        return Err(FormatError::FileNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(FormatError::UnsupportedFormat(format!(
            "'{}' is not a regular file",
            path.display()
        )));
    }

    let kind = infer::get_from_path(path)?;
    let mime = kind.map(|k| k.mime_type());

    if let Some(format) = mime.and_then(DocumentFormat::from_mime) {
        return Ok(format);
    }
    if mime == Some("application/zip") {
        if let Some(format) = probe_ooxml(path)? {
            return Ok(format);
        }
    }

    if mime.is_none() {
        let by_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(DocumentFormat::from_extension);
        if let Some(format) = by_extension {
            return Ok(format);
        }
    }

    Err(FormatError::UnsupportedFormat(match mime {
        Some(mime) => format!("'{}' ({})", path.display(), mime),
        None => format!("'{}'", path.display()),
    }))
}

/// Classify a ZIP container by its OOXML parts.
fn probe_ooxml(path: &Path) -> Result<Option<DocumentFormat>, FormatError> {
    let archive = match ZipArchive::new(BufReader::new(File::open(path)?)) {
        Ok(archive) => archive,
        Err(_) => return Ok(None),
    };
    let mut format = None;
    for name in archive.file_names() {
        if name.starts_with("xl/") {
            format = Some(DocumentFormat::Xlsx);
            break;
        }
        if name.starts_with("word/") {
            format = Some(DocumentFormat::Docx);
            break;
        }
    }
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[&str]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for name in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(b"<x/>").unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            detect_format(&temp.path().join("absent.xlsx")),
            Err(FormatError::FileNotFound(_))
        ));
    }

    #[test]
    fn directory_is_unsupported() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            detect_format(temp.path()),
            Err(FormatError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn detects_pdf_by_magic() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mislabelled.txt");
        fs::write(&path, b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n").unwrap();
        assert_eq!(detect_format(&path).unwrap(), DocumentFormat::Pdf);
    }

    #[test]
    fn detects_png_by_magic() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("image.bin");
        fs::write(&path, b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").unwrap();
        assert_eq!(detect_format(&path).unwrap(), DocumentFormat::Png);
    }

    #[test]
    fn detects_spreadsheet_container() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("book.pdf");
        write_zip(
            &path,
            &["[Content_Types].xml", "docProps/core.xml", "xl/workbook.xml"],
        );
        assert_eq!(detect_format(&path).unwrap(), DocumentFormat::Xlsx);
    }

    #[test]
    fn detects_word_container() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("letter");
        write_zip(
            &path,
            &["[Content_Types].xml", "docProps/core.xml", "word/document.xml"],
        );
        assert_eq!(detect_format(&path).unwrap(), DocumentFormat::Docx);
    }

    #[test]
    fn plain_zip_unsupported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("archive.xlsx");
        write_zip(&path, &["readme.txt"]);
        assert!(matches!(
            detect_format(&path),
            Err(FormatError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn unrecognized_content_falls_back_to_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.PDF");
        fs::write(&path, "just some text").unwrap();
        assert_eq!(detect_format(&path).unwrap(), DocumentFormat::Pdf);
    }

    #[test]
    fn unrecognized_content_and_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, "just some text").unwrap();
        assert!(matches!(
            detect_format(&path),
            Err(FormatError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn recognized_content_beats_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("image.docx");
        fs::write(&path, b"GIF89a\x01\x00\x01\x00").unwrap();
        assert_eq!(detect_format(&path).unwrap(), DocumentFormat::Gif);
    }
}
