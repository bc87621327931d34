//! Output of extraction results: tabular records and visualization overlays.

mod csv;
mod json;
mod overlay;

pub use self::csv::{CsvSink, HEADER};
pub use json::JsonLinesSink;
pub use overlay::{viz_path, OutlineStyle, Overlay, VIZ_PREFIX};

use std::io::Write;

use crate::error::Result;
use crate::highlight::HighlightRecord;

/// Receives records one at a time, in traversal order.
///
/// Implementations write each record as soon as it arrives; nothing is
/// retracted if a later input fails.
pub trait RecordSink {
    fn emit(&mut self, record: &HighlightRecord) -> Result<()>;
}

impl RecordSink for Vec<HighlightRecord> {
    fn emit(&mut self, record: &HighlightRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn emit(&mut self, record: &HighlightRecord) -> Result<()> {
        (**self).emit(record)
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn emit(&mut self, record: &HighlightRecord) -> Result<()> {
        (**self).emit(record)
    }
}

/// Record serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// One JSON object per line
    Json,
}

impl OutputFormat {
    /// Build a sink of this format over `writer`.
    pub fn sink<'w, W: Write + 'w>(self, writer: W) -> Result<Box<dyn RecordSink + 'w>> {
        Ok(match self {
            OutputFormat::Csv => Box::new(CsvSink::new(writer)?),
            OutputFormat::Json => Box::new(JsonLinesSink::new(writer)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects_in_order() {
        let mut records: Vec<HighlightRecord> = Vec::new();
        records.emit(&HighlightRecord::new("a.pdf", 1, "one")).unwrap();
        records.emit(&HighlightRecord::new("a.pdf", 2, "two")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].highlighted_text, "two");
    }

    #[test]
    fn test_format_sink_writes_csv_header() {
        let mut out = Vec::new();
        {
            let mut sink = OutputFormat::Csv.sink(&mut out).unwrap();
            sink.emit(&HighlightRecord::new("a.pdf", 1, "x")).unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Filename,Page_num,Highlighted_text\na.pdf,1,x\n");
    }
}
