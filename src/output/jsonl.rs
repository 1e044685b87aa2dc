//! JSON-lines record sink

use crate::record::OutputRecord;
use crate::HarvestError;
use std::io::Write;
use tokio::sync::mpsc;

/// Writes output records as one JSON object per line
pub struct JsonLinesWriter<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn write_record(&mut self, record: &OutputRecord) -> Result<(), HarvestError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flushes and returns the underlying writer
    pub fn finish(mut self) -> Result<W, HarvestError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Drains a record channel into a JSON-lines writer
///
/// Returns the number of records written once every sender is dropped.
pub async fn drain_to_writer<W: Write>(
    mut records: mpsc::Receiver<OutputRecord>,
    writer: W,
) -> Result<u64, HarvestError> {
    let mut sink = JsonLinesWriter::new(writer);
    while let Some(record) = records.recv().await {
        sink.write_record(&record)?;
    }
    let written = sink.written();
    sink.finish()?;
    Ok(written)
}
