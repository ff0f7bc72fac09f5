//! Shared fixtures for integration tests.
//!
//! Documents are built in memory with the same libraries the crate reads
//! them with, so no binary fixtures are checked in.

#![allow(dead_code)]

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use lopdf::{dictionary, Document, Object};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CORE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>Budget</dc:title><dc:creator>Grace</dc:creator><cp:lastModifiedBy>Ada</cp:lastModifiedBy><cp:revision>4</cp:revision><dcterms:created xsi:type="dcterms:W3CDTF">2023-01-02T08:00:00Z</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">2023-06-30T17:45:00Z</dcterms:modified></cp:coreProperties>"#;

pub const MAIN_PART_BODY: &str = "<document><body>unchanged</body></document>";

fn rels_xml(core_part: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="main"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="{core_part}"/></Relationships>"#
    )
}

/// Write an OOXML package with a main part and a core-properties part.
pub fn write_package(path: &Path, main_part: &str, core_part: &str, core_xml: &str) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(b"<Types/>").unwrap();
    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(rels_xml(core_part).as_bytes()).unwrap();
    zip.start_file(main_part, options).unwrap();
    zip.write_all(MAIN_PART_BODY.as_bytes()).unwrap();
    zip.start_file(core_part, options).unwrap();
    zip.write_all(core_xml.as_bytes()).unwrap();
    zip.finish().unwrap();
}

pub fn write_xlsx(path: &Path, core_xml: &str) {
    write_package(path, "xl/workbook.xml", "docProps/core.xml", core_xml);
}

pub fn write_docx(path: &Path, core_xml: &str) {
    write_package(path, "word/document.xml", "docProps/core.xml", core_xml);
}

/// Read one entry of a ZIP package as text.
pub fn read_entry(path: &Path, name: &str) -> String {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut contents = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    contents
}

/// Write a PDF whose information dictionary holds `Title` and `Author`.
pub fn write_pdf(path: &Path, title: &str, author: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => 0,
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Author" => Object::string_literal(author),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.save(path).unwrap();
}

/// A JPEG carrying one EXIF field: Make = "ACM".
pub fn jpeg_with_make() -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A\x00\x00\x00\x08");
    tiff.extend_from_slice(&[0x00, 0x01]);
    tiff.extend_from_slice(&[0x01, 0x0F, 0x00, 0x02, 0x00, 0x00, 0x00, 0x04]);
    tiff.extend_from_slice(b"ACM\0");
    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    let mut segment = b"Exif\0\0".to_vec();
    segment.extend_from_slice(&tiff);
    let length = u16::try_from(segment.len() + 2).unwrap();

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&length.to_be_bytes());
    jpeg.extend_from_slice(&segment);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}
