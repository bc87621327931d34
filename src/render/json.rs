//! JSON Lines record output.

use std::io::Write;

use crate::error::Result;
use crate::highlight::HighlightRecord;

use super::RecordSink;

/// Streams records as one compact JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn emit(&mut self, record: &HighlightRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_lines() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.emit(&HighlightRecord::new("a.pdf", 1, "Foo Bar"))
            .unwrap();
        sink.emit(&HighlightRecord::new("a.pdf", 2, "line\nbreak"))
            .unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"filename":"a.pdf","page_num":1,"highlighted_text":"Foo Bar"}"#
        );

        let second: HighlightRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.highlighted_text, "line\nbreak");
    }
}
