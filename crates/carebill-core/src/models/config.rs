//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CarebillError, Result};
use crate::invoice::sanitize::MAX_TEXT_LENGTH;

/// Main configuration for carebill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarebillConfig {
    /// Statement extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF loading configuration.
    pub pdf: PdfConfig,
}

/// Statement extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Character cap applied by the sanitizer.
    pub max_text_length: usize,

    /// Keywords that mark a line as the provider heading.
    pub provider_keywords: Vec<String>,

    /// Number of leading non-empty lines scanned for the provider heading.
    pub provider_scan_lines: usize,

    /// Pick the only known child when nothing else matches.
    pub auto_select_only_child: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_text_length: MAX_TEXT_LENGTH,
            provider_keywords: default_provider_keywords(),
            provider_scan_lines: 10,
            auto_select_only_child: true,
        }
    }
}

pub(crate) fn default_provider_keywords() -> Vec<String> {
    ["DAYCARE", "CHILDCARE", "EXPLORERS", "NURSERY"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

/// PDF loading configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Largest accepted file, in bytes.
    pub max_file_size: usize,

    /// Extracted text shorter than this is treated as empty.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            min_text_length: 1,
        }
    }
}

impl CarebillConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| CarebillError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| CarebillError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
