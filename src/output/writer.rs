//! Report writer trait definition.

use crate::consensus::ConsensusInterval;
use crate::error::Result;
use crate::output::{BatchReport, DetectionRecord};

/// Trait for writing detection reports.
pub trait ReportWriter {
    /// Write the file header (if applicable).
    fn write_header(&mut self) -> Result<()>;

    /// Write a single per-file record.
    fn write_record(&mut self, record: &DetectionRecord) -> Result<()>;

    /// Write the batch consensus.
    fn write_consensus(&mut self, consensus: &ConsensusInterval) -> Result<()>;

    /// Finalize the output (flush, close, etc.).
    fn finalize(&mut self) -> Result<()>;
}

/// Drive a writer through a whole report.
pub fn write_report(writer: &mut dyn ReportWriter, report: &BatchReport) -> Result<()> {
    writer.write_header()?;
    for record in &report.records {
        writer.write_record(record)?;
    }
    writer.write_consensus(&report.consensus)?;
    writer.finalize()
}
