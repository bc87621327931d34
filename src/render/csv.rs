//! CSV record output.

use std::io::Write;

use crate::error::Result;
use crate::highlight::HighlightRecord;

use super::RecordSink;

/// Header row written before any record.
pub const HEADER: [&str; 3] = ["Filename", "Page_num", "Highlighted_text"];

/// Streams records as CSV rows, flushing after every row.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// Create the sink and write the header row immediately.
    pub fn new(writer: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(HEADER)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::Error::Io(e.into_error()))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn emit(&mut self, record: &HighlightRecord) -> Result<()> {
        let page = record.page_num.to_string();
        self.writer.write_record([
            record.filename.as_str(),
            page.as_str(),
            record.highlighted_text.as_str(),
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}
