//! PDF text loading.
//!
//! Turns statement PDFs into plain text for the extraction engine. The
//! engine itself never touches files; callers decide when to use this.

mod extractor;

pub use extractor::{validate_pdf_bytes, PdfTextExtractor, PDF_HEADER};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text sources.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;
}
