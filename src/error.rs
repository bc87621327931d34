//! Error types for the pdf-highlights library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdf-highlights operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting highlights.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and requires a password.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// A scale factor is not a finite, positive number.
    #[error("Invalid scale factor {0}: must be finite and greater than zero")]
    InvalidScale(f64),

    /// An input path could not be opened as a PDF document.
    #[error("could not open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// The visualization copy of a document could not be written.
    #[error("could not write visualization {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Failure while processing a specific page of a document.
    #[error("{file}, page {page}: {source}")]
    InPage {
        file: String,
        page: u32,
        #[source]
        source: Box<Error>,
    },

    /// Error writing CSV records.
    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    /// Error writing JSON records.
    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Attach the input path to an error raised while opening it.
    pub fn open(path: impl Into<PathBuf>, source: Error) -> Self {
        Error::Open {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Attach the output path to an error raised while saving it.
    pub fn save(path: impl Into<PathBuf>, source: Error) -> Self {
        Error::Save {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// True for failures confined to one input document: it could not be
    /// opened, one of its pages could not be read, or its visualization could
    /// not be saved. Output sink errors are not document failures.
    pub fn is_document_failure(&self) -> bool {
        matches!(
            self,
            Error::Open { .. } | Error::Save { .. } | Error::InPage { .. }
        )
    }

    /// Attach file and 1-based page number context.
    pub fn in_page(file: impl Into<String>, page: u32, source: Error) -> Self {
        Error::InPage {
            file: file.into(),
            page,
            source: Box::new(source),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_context_wrappers() {
        let err = Error::open("missing.pdf", Error::UnknownFormat);
        assert_eq!(
            err.to_string(),
            "could not open missing.pdf: Unknown file format: not a valid PDF"
        );

        let err = Error::in_page("doc.pdf", 3, Error::PdfParse("bad stream".into()));
        assert_eq!(
            err.to_string(),
            "doc.pdf, page 3: PDF parsing error: bad stream"
        );
    }
}
