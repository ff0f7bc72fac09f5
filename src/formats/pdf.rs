//! formats::pdf
//!
//! Read-only access to the PDF document information dictionary.
//!
//! Entries are listed as found in the trailer's `/Info` dictionary, with
//! the leading slash dropped from keys. `CreationDate` and `ModDate` are
//! shown as `YYYY-MM-DD HH:MM:SS` (UTC) when they parse; everything else
//! is shown as decoded text.

use std::path::Path;

use chrono::{FixedOffset, NaiveDateTime, TimeZone};
use lopdf::{Document, Object};

use super::detect::DocumentFormat;
use super::traits::{ExtractedMetadata, FormatAdapter, FormatError, OpaqueMetadata};
use crate::core::Timestamp;

/// Nested references are followed at most this deep.
const MAX_REFERENCE_DEPTH: usize = 8;

/// Adapter for PDF documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfAdapter;

impl FormatAdapter for PdfAdapter {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn formats(&self) -> &'static [DocumentFormat] {
        &[DocumentFormat::Pdf]
    }

    fn extract(
        &self,
        path: &Path,
        _format: DocumentFormat,
    ) -> Result<ExtractedMetadata, FormatError> {
        let document = Document::load(path)?;
        let mut metadata = OpaqueMetadata::new();

        let Ok(info) = document.trailer.get(b"Info") else {
            return Ok(ExtractedMetadata::Opaque(metadata));
        };
        let info = resolve(&document, info, 0)?;
        for (key, value) in info.as_dict()?.iter() {
            let key = String::from_utf8_lossy(key).into_owned();
            let mut text = display_object(&document, value, 0);
            if key == "CreationDate" || key == "ModDate" {
                if let Some(ts) = parse_pdf_date(&text) {
                    text = ts.to_string();
                }
            }
            metadata.push(key, text);
        }

        Ok(ExtractedMetadata::Opaque(metadata))
    }
}

fn resolve<'a>(
    document: &'a Document,
    object: &'a Object,
    depth: usize,
) -> Result<&'a Object, lopdf::Error> {
    match object {
        Object::Reference(id) if depth < MAX_REFERENCE_DEPTH => {
            resolve(document, document.get_object(*id)?, depth + 1)
        }
        other => Ok(other),
    }
}

fn display_object(document: &Document, object: &Object, depth: usize) -> String {
    match object {
        Object::String(bytes, _) => decode_text_string(bytes),
        Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
        Object::Integer(i) => i.to_string(),
        Object::Real(r) => r.to_string(),
        Object::Boolean(b) => b.to_string(),
        Object::Null => String::new(),
        Object::Array(items) => items
            .iter()
            .map(|item| display_object(document, item, depth + 1))
            .collect::<Vec<_>>()
            .join(", "),
        Object::Reference(_) if depth < MAX_REFERENCE_DEPTH => match resolve(document, object, depth) {
            Ok(target) => display_object(document, target, depth + 1),
            Err(_) => String::new(),
        },
        _ => String::new(),
    }
}

/// Decode a PDF text string: UTF-16BE when it carries a byte order mark,
/// otherwise one byte per character.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(utf8).into_owned();
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Parse a PDF date (`D:YYYYMMDDHHmmSS+HH'mm'`) into a UTC timestamp.
///
/// The timezone suffix may be `Z`, `+HH'mm'`, `-HH'mm`, or absent (taken
/// as UTC). Only the full 14-digit date-time form is accepted.
pub fn parse_pdf_date(raw: &str) -> Option<Timestamp> {
    let s = raw.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);
    if s.len() < 14 || !s.is_char_boundary(14) {
        return None;
    }
    let (digits, zone) = s.split_at(14);
    let naive = NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S").ok()?;

    let zone = zone.trim_end_matches('\'');
    let offset_seconds = match zone.chars().next() {
        None | Some('Z') => 0,
        Some(sign @ ('+' | '-')) => {
            let rest: String = zone[1..].chars().filter(|c| c.is_ascii_digit()).collect();
            if rest.len() < 2 {
                return None;
            }
            let hours: i32 = rest[..2].parse().ok()?;
            let minutes: i32 = rest.get(2..4).map_or(Ok(0), str::parse).ok()?;
            let total = hours * 3600 + minutes * 60;
            if sign == '-' {
                -total
            } else {
                total
            }
        }
        Some(_) => return None,
    };

    let offset = FixedOffset::east_opt(offset_seconds)?;
    let local = offset.from_local_datetime(&naive).single()?;
    Some(Timestamp::new(local.naive_utc()))
}
