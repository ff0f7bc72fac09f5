//! formats
//!
//! Document format detection and read/write adapters.
//!
//! # Architecture
//!
//! The [`FormatAdapter`] trait is the only boundary between the session and
//! a format library. Detection is by content, never by file name.
//!
//! # Modules
//!
//! - `detect`: Magic-byte sniffing and OOXML container probing
//! - `traits`: `FormatAdapter`, `FormatError` and extraction results
//! - `registry`: Format-to-adapter lookup
//! - [`ooxml`]: Spreadsheets and word-processing documents (read and write)
//! - [`pdf`]: PDF information dictionary (read-only)
//! - [`image`]: EXIF fields of JPEG/PNG images (read-only)

mod detect;
pub mod image;
pub mod ooxml;
pub mod pdf;
mod registry;
mod traits;

pub use detect::{detect_format, DocumentFormat, FormatFamily};
pub use image::ImageAdapter;
pub use ooxml::OoxmlAdapter;
pub use pdf::PdfAdapter;
pub use registry::{FormatEntry, FormatRegistry};
pub use traits::*;
