//! formats::image
//!
//! Read-only EXIF listing for JPEG and PNG images.
//!
//! Only fields from the primary image IFD are listed; thumbnail fields are
//! skipped. An image without EXIF data yields an empty listing rather than
//! an error. GIF has no EXIF container and always lists nothing.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::detect::DocumentFormat;
use super::traits::{ExtractedMetadata, FormatAdapter, FormatError, OpaqueMetadata};

/// Adapter for raster images.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageAdapter;

impl FormatAdapter for ImageAdapter {
    fn name(&self) -> &'static str {
        "image"
    }

    fn formats(&self) -> &'static [DocumentFormat] {
        &[DocumentFormat::Jpeg, DocumentFormat::Png, DocumentFormat::Gif]
    }

    fn extract(
        &self,
        path: &Path,
        format: DocumentFormat,
    ) -> Result<ExtractedMetadata, FormatError> {
        let mut metadata = OpaqueMetadata::new();
        if format == DocumentFormat::Gif {
            return Ok(ExtractedMetadata::Opaque(metadata));
        }

        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FormatError::FileNotFound(path.to_path_buf()),
            _ => FormatError::Io(e),
        })?;
        let mut reader = exif::Reader::new();
        reader.continue_on_error(true);
        let exif = match reader
            .read_from_container(&mut BufReader::new(file))
            .or_else(|e| e.distill_partial_result(|_| {}))
        {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => return Ok(ExtractedMetadata::Opaque(metadata)),
            Err(e) => return Err(e.into()),
        };

        for field in exif.fields() {
            if field.ifd_num != exif::In::PRIMARY {
                continue;
            }
            metadata.push(field.tag.to_string(), field_text(field));
        }

        Ok(ExtractedMetadata::Opaque(metadata))
    }
}

/// Ascii fields are shown without the quoting `display_value` adds.
fn field_text(field: &exif::Field) -> String {
    match &field.value {
        exif::Value::Ascii(parts) => parts
            .iter()
            .map(|p| String::from_utf8_lossy(p).trim().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        _ => field.display_value().to_string(),
    }
}
