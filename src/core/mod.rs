//! core
//!
//! Core domain types and the metadata reconciler.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Property, Timestamp, Value
//! - [`record`] - Fixed-schema MetadataRecord and user Edits
//! - [`issues`] - Validation rules and the IssueReport
//! - [`reconcile`] - Pure merge of a record with edits
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Nothing in this module performs document I/O
//! - All reconciliation is deterministic

pub mod config;
pub mod issues;
pub mod reconcile;
pub mod record;
pub mod types;

pub use issues::{issues, Issue, IssueReport};
pub use reconcile::{reconcile, reconcile_with, ReconcileOptions};
pub use record::{Edits, MetadataRecord};
pub use types::{Property, Timestamp, ValidationError, Value};
