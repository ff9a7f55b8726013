use anyhow::{Context, Result};
use plex_export_models::export_row::CSV_HEADER;
use plex_export_models::ExportRow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// CSV output sink: header first, then one record per exported row.
///
/// The underlying `csv::Writer` flushes on drop, so rows written before an
/// abnormal exit still reach disk once the file exists.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref()).with_context(|| {
            format!("Failed to create output file {}", path.as_ref().display())
        })?;
        Ok(Self::new(file))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    pub fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(CSV_HEADER)
            .context("Failed to write CSV header")?;
        Ok(())
    }

    pub fn write_row(&mut self, row: &ExportRow) -> Result<()> {
        self.writer
            .write_record(row.to_record())
            .context("Failed to write CSV row")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush CSV output")?;
        Ok(())
    }

    /// Consume the sink and hand back the inner writer (test helper).
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to finalize CSV output: {}", e))
    }
}
