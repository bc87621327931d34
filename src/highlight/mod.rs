//! Highlight extraction: regions, text aggregation and the document pipeline.

mod extractor;
mod regions;

pub use extractor::{FileReport, HighlightExtractor, RunSummary};
pub use regions::{aggregate_text, regions, Regions, VERTICES_PER_REGION};

use serde::{Deserialize, Serialize};

/// One output row: the text of one highlight annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRecord {
    /// Input path as given by the caller
    pub filename: String,
    /// Page number (1-indexed)
    pub page_num: u32,
    /// Region texts joined with single spaces; empty when no region had text
    pub highlighted_text: String,
}

impl HighlightRecord {
    pub fn new(
        filename: impl Into<String>,
        page_num: u32,
        highlighted_text: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            page_num,
            highlighted_text: highlighted_text.into(),
        }
    }
}
