//! formats::registry
//!
//! Format-to-adapter lookup.
//!
//! Commands and the session go through a [`FormatRegistry`] instead of
//! naming adapters directly, so a caller can register a replacement
//! adapter (or a test double) without touching the session code.
//!
//! # Example
//!
//! ```
//! use docmeta::formats::{DocumentFormat, FormatRegistry};
//!
//! let registry = FormatRegistry::with_defaults();
//! let adapter = registry.adapter_for(DocumentFormat::Docx).unwrap();
//! assert!(adapter.supports_write_back());
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use super::detect::{detect_format, DocumentFormat, FormatFamily};
use super::image::ImageAdapter;
use super::ooxml::OoxmlAdapter;
use super::pdf::PdfAdapter;
use super::traits::{FormatAdapter, FormatError};

/// One row of [`FormatRegistry::entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatEntry {
    pub format: DocumentFormat,
    pub family: FormatFamily,
    /// Canonical file extension, without the dot.
    pub extension: &'static str,
    pub description: &'static str,
    pub adapter: &'static str,
    pub write_back: bool,
}

/// Registered adapters, keyed by format.
#[derive(Clone, Default)]
pub struct FormatRegistry {
    adapters: BTreeMap<DocumentFormat, Arc<dyn FormatAdapter>>,
}

impl FormatRegistry {
    /// A registry with no adapters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with the built-in OOXML, PDF and image adapters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(OoxmlAdapter));
        registry.register(Arc::new(PdfAdapter));
        registry.register(Arc::new(ImageAdapter));
        registry
    }

    /// Register `adapter` for every format it declares, replacing any
    /// adapter previously registered for those formats.
    pub fn register(&mut self, adapter: Arc<dyn FormatAdapter>) {
        for format in adapter.formats() {
            self.adapters.insert(*format, Arc::clone(&adapter));
        }
    }

    /// The adapter for `format`.
    ///
    /// # Errors
    ///
    /// `FormatError::UnsupportedFormat` if nothing is registered for it.
    pub fn adapter_for(&self, format: DocumentFormat) -> Result<Arc<dyn FormatAdapter>, FormatError> {
        self.adapters.get(&format).cloned().ok_or_else(|| {
            FormatError::UnsupportedFormat(format!("no adapter registered for {format}"))
        })
    }

    /// Detect the format of `path` and return it with its adapter.
    pub fn detect(
        &self,
        path: &Path,
    ) -> Result<(DocumentFormat, Arc<dyn FormatAdapter>), FormatError> {
        let format = detect_format(path)?;
        let adapter = self.adapter_for(format)?;
        Ok((format, adapter))
    }

    /// Registered formats in a stable order.
    pub fn entries(&self) -> Vec<FormatEntry> {
        self.adapters
            .iter()
            .map(|(format, adapter)| FormatEntry {
                format: *format,
                family: format.family(),
                extension: format.extension(),
                description: format.description(),
                adapter: adapter.name(),
                write_back: adapter.supports_write_back(),
            })
            .collect()
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.adapters.iter().map(|(k, v)| (k, v.name())))
            .finish()
    }
}
