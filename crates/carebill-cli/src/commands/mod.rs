//! CLI subcommands and the input handling they share.

pub mod batch;
pub mod config;
pub mod process;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use carebill_core::models::config::{CarebillConfig, PdfConfig};
use carebill_core::{KnownChild, PdfTextExtractor};

/// `<config dir>/carebill/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("carebill")
        .join("config.json")
}

/// Load the explicit config file, else the default one if it exists, else
/// built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<CarebillConfig> {
    if let Some(path) = config_path {
        return Ok(CarebillConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(CarebillConfig::from_file(&default_path)?)
    } else {
        Ok(CarebillConfig::default())
    }
}

/// Known children from a JSON array of `{id, name, reference_number}`.
pub fn load_children(path: Option<&Path>) -> anyhow::Result<Vec<KnownChild>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read children file {}: {}", path.display(), e))?;
    let children: Vec<KnownChild> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid children file {}: {}", path.display(), e))?;

    debug!("Loaded {} known children", children.len());
    Ok(children)
}

/// Whether `path` is a file the CLI can read a statement from.
pub fn is_statement_file(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    matches!(ext.as_str(), "pdf" | "txt" | "text")
}

/// Statement text: PDFs go through the PDF loader, anything else is read as
/// UTF-8.
pub fn read_statement_text(path: &Path, pdf_config: &PdfConfig) -> anyhow::Result<String> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        let data = fs::read(path)?;
        let mut extractor = PdfTextExtractor::with_config(pdf_config.clone());
        let text = extractor.text_from_bytes(&data)?;
        debug!("Read {} characters from PDF {}", text.len(), path.display());
        Ok(text)
    } else {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        Ok(text)
    }
}
