//! Error types for the carebill-core library.
//!
//! The extraction engine itself never fails; these cover the outer layers
//! (document loading and configuration files).

use thiserror::Error;

/// Main error type for the carebill library.
#[derive(Error, Debug)]
pub enum CarebillError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF loading.
#[derive(Error, Debug)]
pub enum PdfError {
    /// No bytes were supplied.
    #[error("PDF file is empty")]
    Empty,

    /// The file exceeds the configured size limit.
    #[error("PDF file is too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    /// The bytes do not start with a PDF header.
    #[error("file is not a PDF")]
    NotPdf,

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),
}

/// Result type for the carebill library.
pub type Result<T> = std::result::Result<T, CarebillError>;
