//! Page extraction
//!
//! This module turns raw page markup into the pieces that get persisted:
//! - the normalized readable text of the page
//! - API endpoint mentions
//! - tables

mod content;
mod structured;

pub use content::{collapse_whitespace, extract_content, ContentExtractor};
pub use structured::{extract_endpoints, extract_tables, StructuredContent, Table};

/// Everything extracted from one page during a single processing cycle
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub raw_markup: String,
    pub normalized_text: String,
    /// Endpoint mentions and tables
    pub structured: StructuredContent,
}

impl ExtractedPage {
    /// Runs both extraction passes over the markup
    pub fn from_markup(markup: String, extractor: &ContentExtractor) -> Self {
        let normalized_text = extractor.extract(&markup);
        let structured = StructuredContent::from_markup(&markup);
        Self {
            raw_markup: markup,
            normalized_text,
            structured,
        }
    }
}
