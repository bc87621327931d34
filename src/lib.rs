//! # pdf-highlights
//!
//! Extract the text under highlight annotations in PDF documents.
//!
//! Every page of every input is scanned for `/Highlight` annotations. The
//! text covered by each annotation's quadrilaterals is collected and emitted
//! as one [`HighlightRecord`] per annotation: file name, 1-based page number
//! and the highlighted text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_highlights::extract_highlights;
//!
//! fn main() -> pdf_highlights::Result<()> {
//!     for record in extract_highlights("paper.pdf")? {
//!         println!("p{}: {}", record.page_num, record.highlighted_text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Region scaling**: widen or narrow each highlight rectangle about its
//!   centre to compensate for viewers that draw tight boxes
//! - **Visualization**: write a `viz_` copy of each input with the rectangles
//!   that were read outlined in red
//! - **Streaming output**: CSV or JSON lines, written as records are produced
//! - **Lenient mode**: skip unreadable inputs instead of aborting the run

pub mod detect;
pub mod error;
pub mod geometry;
pub mod highlight;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use geometry::{Matrix, Point, Quad, Rect, ScaleFactors};
pub use highlight::{FileReport, HighlightExtractor, HighlightRecord, RunSummary};
pub use parser::{ErrorMode, ExtractOptions, LopdfBackend, OutlineCanvas, PdfBackend};
pub use render::{CsvSink, JsonLinesSink, OutlineStyle, OutputFormat, RecordSink};

use std::path::Path;

/// Extract every highlight of a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use pdf_highlights::extract_highlights;
///
/// let records = extract_highlights("paper.pdf").unwrap();
/// println!("{} highlights", records.len());
/// ```
pub fn extract_highlights<P: AsRef<Path>>(path: P) -> Result<Vec<HighlightRecord>> {
    extract_highlights_with_options(path, &ExtractOptions::default())
}

/// Extract every highlight of a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdf_highlights::{extract_highlights_with_options, ExtractOptions, ScaleFactors};
///
/// let options = ExtractOptions::new()
///     .with_scale(ScaleFactors::new(1.1, 1.0)?)
///     .with_visualize(true);
/// let records = extract_highlights_with_options("paper.pdf", &options)?;
/// # Ok::<(), pdf_highlights::Error>(())
/// ```
pub fn extract_highlights_with_options<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
) -> Result<Vec<HighlightRecord>> {
    let mut records = Vec::new();
    HighlightExtractor::new(options.clone()).extract_file(path, &mut records)?;
    Ok(records)
}

/// Extract highlights from an in-memory PDF.
///
/// `filename` is copied into every record. Visualization is not available
/// for in-memory input.
pub fn extract_highlights_from_bytes(
    data: &[u8],
    filename: &str,
    options: &ExtractOptions,
) -> Result<Vec<HighlightRecord>> {
    let backend = LopdfBackend::load_bytes(data)?;
    let mut records = Vec::new();
    HighlightExtractor::new(options.clone()).extract_document(
        filename,
        &backend,
        &mut records,
        |_, _| {},
    )?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_rejects_non_pdf() {
        let result = extract_highlights_from_bytes(b"not a pdf", "x.pdf", &ExtractOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_from_bytes_empty_data() {
        let result = extract_highlights_from_bytes(&[], "x.pdf", &ExtractOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let result = extract_highlights("definitely/not/here.pdf");
        assert!(matches!(result, Err(Error::Open { .. })));
    }

    #[test]
    fn test_detect_valid_pdf_17() {
        let format = detect_format_from_bytes(b"%PDF-1.7\n%test").unwrap();
        assert_eq!(format.version, "1.7");
    }
}
