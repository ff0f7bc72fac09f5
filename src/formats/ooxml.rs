//! formats::ooxml
//!
//! Core properties of Office Open XML packages (`.xlsx`, `.docx`).
//!
//! # Layout
//!
//! The properties live in a single XML part, normally
//! `docProps/core.xml`, located through the package relationships in
//! `_rels/.rels`. Each property is one flat element:
//!
//! ```xml
//! <cp:coreProperties ...>
//!   <dc:title>Q3</dc:title>
//!   <dcterms:created xsi:type="dcterms:W3CDTF">2024-01-01T09:00:00Z</dcterms:created>
//! </cp:coreProperties>
//! ```
//!
//! # Write-back
//!
//! Writing edits the existing part in place (replace, insert or remove one
//! element per property), copies every other entry byte-for-byte, and
//! replaces the package atomically: the new archive is written next to the
//! original, given the original's permissions, and renamed over it only
//! once complete.
//!
//! # Element text
//!
//! Text is read with entity references decoded and CDATA sections taken
//! literally. Comments inside an element are dropped.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::detect::DocumentFormat;
use super::traits::{ExtractedMetadata, FormatAdapter, FormatError};
use crate::core::{MetadataRecord, Property, Timestamp, ValidationError, Value};

const RELS_ENTRY: &str = "_rels/.rels";
const DEFAULT_CORE_ENTRY: &str = "docProps/core.xml";
const CORE_REL_TYPE_SUFFIX: &str = "/metadata/core-properties";

/// Namespaces the canonical element prefixes rely on.
const NAMESPACES: [(&str, &str); 4] = [
    (
        "cp",
        "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
    ),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("xsi", "http://www.w3.org/2001/XMLSchema-instance"),
];

/// Adapter for spreadsheet and word-processor packages.
#[derive(Debug, Default, Clone, Copy)]
pub struct OoxmlAdapter;

impl FormatAdapter for OoxmlAdapter {
    fn name(&self) -> &'static str {
        "ooxml"
    }

    fn formats(&self) -> &'static [DocumentFormat] {
        &[DocumentFormat::Xlsx, DocumentFormat::Docx]
    }

    fn extract(
        &self,
        path: &Path,
        format: DocumentFormat,
    ) -> Result<ExtractedMetadata, FormatError> {
        let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
        let (_, xml) = read_core_part(&mut archive, format)?;
        Ok(ExtractedMetadata::Record(parse_core_properties(&xml)?))
    }

    fn supports_write_back(&self) -> bool {
        true
    }

    fn write_back(
        &self,
        path: &Path,
        format: DocumentFormat,
        record: &MetadataRecord,
    ) -> Result<(), FormatError> {
        let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
        let (core_name, xml) = read_core_part(&mut archive, format)?;
        let updated = render_core_properties(&xml, record).ok_or_else(|| {
            FormatError::Malformed {
                format,
                message: "core properties part has no coreProperties root".to_string(),
            }
        })?;

        let temp_path = staging_path(path);
        let written = rewrite_package(&mut archive, &core_name, &updated, &temp_path)
            .and_then(|()| copy_permissions(path, &temp_path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        drop(archive);

        fs::rename(&temp_path, path).inspect_err(|_| {
            let _ = fs::remove_file(&temp_path);
        })?;
        Ok(())
    }
}

/// XML element for a property: (canonical prefix, local name).
fn element_of(property: Property) -> (&'static str, &'static str) {
    match property {
        Property::Title => ("dc", "title"),
        Property::Subject => ("dc", "subject"),
        Property::Creator => ("dc", "creator"),
        Property::Keywords => ("cp", "keywords"),
        Property::Description => ("dc", "description"),
        Property::LastModifiedBy => ("cp", "lastModifiedBy"),
        Property::Revision => ("cp", "revision"),
        Property::Created => ("dcterms", "created"),
        Property::Modified => ("dcterms", "modified"),
        Property::Category => ("cp", "category"),
        Property::ContentStatus => ("cp", "contentStatus"),
        Property::Language => ("dc", "language"),
        Property::Identifier => ("dc", "identifier"),
    }
}

/// One element matcher per property, in schema order. Each matches the
/// element by local name with any prefix, empty or not; group 1 holds the
/// text content when the element is not self-closing.
static ELEMENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    Property::ALL
        .iter()
        .map(|&property| {
            let (_, local) = element_of(property);
            let pattern = format!(
                r"(?s)<(?:[A-Za-z_][\w.-]*:)?{local}(?:\s[^>]*?)?(?:/>|>(.*?)</(?:[A-Za-z_][\w.-]*:)?{local}\s*>)"
            );
            Regex::new(&pattern).expect("element pattern is valid")
        })
        .collect()
});

static ROOT_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(?:[A-Za-z_][\w.-]*:)?coreProperties\b[^>]*?(/?)>").expect("valid pattern")
});

static ROOT_CLOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</(?:[A-Za-z_][\w.-]*:)?coreProperties\s*>").expect("valid pattern")
});

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#x[0-9A-Fa-f]+|#[0-9]+|amp|lt|gt|quot|apos);").expect("valid pattern")
});

/// A CDATA section (group 1 is its content) or a comment.
static CDATA_OR_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>|<!--.*?-->").expect("valid pattern")
});

static RELATIONSHIP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(?:[A-Za-z_][\w.-]*:)?Relationship\b[^>]*>").expect("valid pattern")
});

static TYPE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bType\s*=\s*["']([^"']*)["']"#).expect("valid pattern"));

static TARGET_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bTarget\s*=\s*["']([^"']*)["']"#).expect("valid pattern"));

fn element_regex(property: Property) -> &'static Regex {
    let index = Property::ALL
        .iter()
        .position(|&p| p == property)
        .unwrap_or_default();
    &ELEMENT_PATTERNS[index]
}

/// Parse the 13 schema properties out of a core properties part.
///
/// Empty elements read as absent. Dates are W3CDTF and are normalized to
/// naive UTC.
///
/// # Errors
///
/// Returns `ValidationError::InvalidDate` if a created/modified element
/// holds something that is not a date.
pub fn parse_core_properties(xml: &str) -> Result<MetadataRecord, ValidationError> {
    let mut record = MetadataRecord::new();
    for property in Property::ALL {
        let Some(caps) = element_regex(property).captures(xml) else {
            continue;
        };
        let raw = caps.get(1).map_or("", |m| m.as_str());
        let text = element_text(raw);
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if property.is_date() {
            let ts = Timestamp::from_w3cdtf(text).ok_or_else(|| ValidationError::InvalidDate {
                property,
                value: text.to_string(),
            })?;
            record.set_timestamp(property, ts)?;
        } else {
            record.set_text(property, text)?;
        }
    }
    Ok(record)
}

/// Apply a record to an existing core properties part.
///
/// Present values replace (or are inserted as) their element; absent values
/// remove it. Unrelated elements are left alone. Returns `None` if the part
/// has no `coreProperties` root to insert into.
pub fn render_core_properties(xml: &str, record: &MetadataRecord) -> Option<String> {
    let mut out = expand_empty_root(xml)?;

    for (property, value) in record.iter() {
        let re = element_regex(property);
        let element = value.map(|v| render_element(property, v));

        if re.is_match(&out) {
            let replacement = element.as_deref().unwrap_or("");
            out = re.replace(&out, NoExpand(replacement)).into_owned();
        } else if let Some(element) = element {
            let close = ROOT_CLOSE.find(&out)?.start();
            out.insert_str(close, &element);
        }
    }

    if record.present_count() > 0 {
        out = ensure_namespaces(&out)?;
    }
    Some(out)
}

/// Turn a self-closing `<cp:coreProperties .../>` into an open/close pair.
fn expand_empty_root(xml: &str) -> Option<String> {
    let caps = ROOT_OPEN.captures(xml)?;
    let whole = caps.get(0)?;
    if caps.get(1).map_or(true, |m| m.as_str().is_empty()) {
        return Some(xml.to_string());
    }
    let tag = whole.as_str();
    let name_end = tag[1..]
        .find(|c: char| c.is_whitespace() || c == '/')
        .map(|i| i + 1)
        .unwrap_or(tag.len() - 2);
    let qualified = &tag[1..name_end];
    let opened = format!("{}>", tag[..tag.len() - 2].trim_end());
    let mut out = String::with_capacity(xml.len() + qualified.len() + 4);
    out.push_str(&xml[..whole.start()]);
    out.push_str(&opened);
    out.push_str(&format!("</{qualified}>"));
    out.push_str(&xml[whole.end()..]);
    Some(out)
}

/// Declare any canonical prefix the root does not already declare.
fn ensure_namespaces(xml: &str) -> Option<String> {
    let whole = ROOT_OPEN.find(xml)?;
    let tag = whole.as_str();
    let mut extra = String::new();
    for (prefix, uri) in NAMESPACES {
        if !tag.contains(&format!("xmlns:{prefix}=")) {
            extra.push_str(&format!(" xmlns:{prefix}=\"{uri}\""));
        }
    }
    if extra.is_empty() {
        return Some(xml.to_string());
    }
    let insert_at = whole.end() - 1;
    let mut out = xml.to_string();
    out.insert_str(insert_at, &extra);
    Some(out)
}

fn render_element(property: Property, value: &Value) -> String {
    let (prefix, local) = element_of(property);
    match value {
        Value::Timestamp(ts) => format!(
            "<{prefix}:{local} xsi:type=\"dcterms:W3CDTF\">{}</{prefix}:{local}>",
            ts.to_w3cdtf()
        ),
        Value::Text(text) => format!("<{prefix}:{local}>{}</{prefix}:{local}>", escape_xml(text)),
    }
}

fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Character data of an element: references decoded outside CDATA
/// sections, CDATA content kept verbatim, comments removed.
fn element_text(raw: &str) -> Cow<'_, str> {
    if !raw.contains("<!") {
        return unescape_xml(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for caps in CDATA_OR_COMMENT.captures_iter(raw) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&unescape_xml(&raw[last..whole.start()]));
        if let Some(cdata) = caps.get(1) {
            out.push_str(cdata.as_str());
        }
        last = whole.end();
    }
    out.push_str(&unescape_xml(&raw[last..]));
    Cow::Owned(out)
}

fn unescape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    ENTITY.replace_all(text, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        let decoded = match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => {
                let code = match name.strip_prefix("#x") {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => name[1..].parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
            }
        };
        decoded.map_or_else(|| caps[0].to_string(), String::from)
    })
}

/// Find the core properties part name via package relationships.
fn core_part_name<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String, FormatError> {
    let Some(rels) = read_entry(archive, RELS_ENTRY)? else {
        return Ok(DEFAULT_CORE_ENTRY.to_string());
    };
    for tag in RELATIONSHIP.find_iter(&rels) {
        let tag = tag.as_str();
        let is_core = TYPE_ATTR
            .captures(tag)
            .is_some_and(|c| c[1].ends_with(CORE_REL_TYPE_SUFFIX));
        if let (true, Some(target)) = (is_core, TARGET_ATTR.captures(tag)) {
            return Ok(target[1].trim_start_matches('/').to_string());
        }
    }
    Ok(DEFAULT_CORE_ENTRY.to_string())
}

fn read_core_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    format: DocumentFormat,
) -> Result<(String, String), FormatError> {
    let name = core_part_name(archive)?;
    let xml = read_entry(archive, &name)?.ok_or_else(|| FormatError::Malformed {
        format,
        message: format!("missing core properties part '{name}'"),
    })?;
    Ok((name, xml))
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, FormatError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            Ok(Some(contents))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Sibling path used while the new package is being written.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".docmeta-tmp");
    path.with_file_name(name)
}

/// Give the staged package the permissions of the file it replaces.
fn copy_permissions(original: &Path, staged: &Path) -> Result<(), FormatError> {
    fs::set_permissions(staged, fs::metadata(original)?.permissions())?;
    Ok(())
}

fn rewrite_package<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    core_name: &str,
    core_xml: &str,
    temp_path: &Path,
) -> Result<(), FormatError> {
    let mut writer = ZipWriter::new(BufWriter::new(File::create(temp_path)?));

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        if entry.name() == core_name {
            let name = entry.name().to_string();
            drop(entry);
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            writer.start_file(name, options)?;
            writer.write_all(core_xml.as_bytes())?;
        } else {
            writer.raw_copy_file(entry)?;
        }
    }

    let buffered = writer.finish()?;
    let file = buffered.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}
