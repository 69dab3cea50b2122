//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use super::{PdfProcessor, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Leading bytes of every PDF file.
pub const PDF_HEADER: &[u8] = b"%PDF-";

/// Reject input that is empty, larger than `max_size` bytes, or not a PDF.
pub fn validate_pdf_bytes(data: &[u8], max_size: usize) -> Result<()> {
    if data.is_empty() {
        return Err(PdfError::Empty);
    }
    if data.len() > max_size {
        return Err(PdfError::TooLarge {
            size: data.len(),
            limit: max_size,
        });
    }
    if !data.starts_with(PDF_HEADER) {
        return Err(PdfError::NotPdf);
    }
    Ok(())
}

/// PDF text extractor using lopdf.
pub struct PdfTextExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    config: PdfConfig,
}

impl PdfTextExtractor {
    /// Create a new PDF extractor with default limits.
    pub fn new() -> Self {
        Self::with_config(PdfConfig::default())
    }

    pub fn with_config(config: PdfConfig) -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            config,
        }
    }

    /// Load `data` and return its text in one step.
    pub fn text_from_bytes(&mut self, data: &[u8]) -> Result<String> {
        self.load(data)?;
        self.extract_text()
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfTextExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        validate_pdf_bytes(data, self.config.max_file_size)?;

        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages ({} bytes)", page_count, data.len());
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    /// Text shorter than `min_text_length` characters (after trimming) is
    /// returned as empty so the engine reports it.
    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }

        let text = pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        let length = text.trim().chars().count();
        debug!("Extracted {} characters of text", length);

        if length < self.config.min_text_length {
            return Ok(String::new());
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfTextExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
    }

    #[test]
    fn test_validate_empty() {
        assert!(matches!(validate_pdf_bytes(b"", 100), Err(PdfError::Empty)));
    }

    #[test]
    fn test_validate_too_large() {
        let data = [b'%', b'P', b'D', b'F', b'-', b'1', b'.', b'4'];
        match validate_pdf_bytes(&data, 4) {
            Err(PdfError::TooLarge { size, limit }) => {
                assert_eq!(size, 8);
                assert_eq!(limit, 4);
            }
            other => panic!("expected TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_header() {
        assert!(matches!(validate_pdf_bytes(b"hello world", 100), Err(PdfError::NotPdf)));
        assert!(validate_pdf_bytes(b"%PDF-1.7\n", 100).is_ok());
    }

    #[test]
    fn test_load_rejects_non_pdf() {
        let mut extractor = PdfTextExtractor::new();
        assert!(matches!(extractor.load(b"plain text statement"), Err(PdfError::NotPdf)));
        assert!(extractor.document.is_none());
    }

    #[test]
    fn test_load_respects_configured_limit() {
        let config = PdfConfig {
            max_file_size: 8,
            ..Default::default()
        };
        let mut extractor = PdfTextExtractor::with_config(config);
        assert!(matches!(
            extractor.load(b"%PDF-1.4 and much more"),
            Err(PdfError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_load_garbage_after_header() {
        let mut extractor = PdfTextExtractor::new();
        assert!(matches!(extractor.load(b"%PDF-1.4\nnot really"), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_extract_without_document() {
        let extractor = PdfTextExtractor::new();
        assert!(matches!(extractor.extract_text(), Err(PdfError::Parse(_))));
    }
}
