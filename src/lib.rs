//! docmeta - inspect and edit document metadata
//!
//! docmeta reads the core metadata of office documents, PDFs and images,
//! reconciles user edits against a fixed property schema, writes the result
//! back where the format allows, aligns filesystem timestamps with the
//! saved dates, and reports a content digest.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the session)
//! - [`session`] - One open document: extract, edit, save, digest
//! - [`core`] - Domain types, the reconciler, and configuration
//! - [`formats`] - Format detection and read/write adapters
//! - [`integrity`] - Digests and timestamp synchronization
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! 1. A saved record always has the full fixed property schema
//! 2. Validation completes before any byte of a document is written
//! 3. Documents are replaced atomically; a failed write leaves the original
//! 4. Read-only formats are never written

pub mod cli;
pub mod core;
pub mod formats;
pub mod integrity;
pub mod session;
pub mod ui;
