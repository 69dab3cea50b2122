//! Core library for daycare statement extraction.
//!
//! This crate provides:
//! - Text sanitizing for untrusted document text
//! - Field resolution for child identity, references, dates and fee labels
//! - Financial reconciliation with cent-exact decimal arithmetic
//! - Matching of the extracted child against a caller-supplied roster
//! - Optional PDF text loading (feature `pdf`)

pub mod error;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod invoice;

pub use error::{CarebillError, PdfError, Result};
pub use models::config::{CarebillConfig, ExtractionConfig, PdfConfig};
pub use models::record::{
    ChildId, ExtractedInvoiceRecord, ExtractionWarning, FieldTrace, KnownChild, RecordField,
    WarningKind,
};
#[cfg(feature = "pdf")]
pub use pdf::{PdfTextExtractor, validate_pdf_bytes};
pub use invoice::{extract, ExtractionResult, StatementParser};
