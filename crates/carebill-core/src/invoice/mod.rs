//! Statement field extraction module.

pub mod matcher;
mod parser;
pub mod rules;
pub mod sanitize;

pub use matcher::{match_child, ChildMatch, MatchStrategy};
pub use parser::{extract, ExtractionResult, StatementParser};

use crate::models::record::KnownChild;

/// Trait for statement extractors.
pub trait StatementExtractor {
    /// Extract a record from raw document text, matching the child against
    /// `known_children`.
    fn extract(&self, raw_text: &str, known_children: &[KnownChild]) -> ExtractionResult;
}
