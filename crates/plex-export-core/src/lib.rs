pub mod export;
pub mod writer;

pub use export::{ExportStats, Exporter};
pub use writer::CsvSink;
