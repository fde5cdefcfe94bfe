//! JSON report writer.

use crate::consensus::ConsensusInterval;
use crate::error::{Error, Result};
use crate::output::{DetectionRecord, ReportWriter};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// JSON report document.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    /// When the report was written.
    pub generated_at: DateTime<Local>,
    /// Per-file detections.
    pub files: Vec<DetectionRecord>,
    /// Batch consensus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consensus: Option<ConsensusInterval>,
}

/// Buffers a report and writes it as one document on finalize.
pub struct JsonReportWriter {
    path: PathBuf,
    report: JsonReport,
}

impl JsonReportWriter {
    /// Create a new JSON writer.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            report: JsonReport {
                generated_at: Local::now(),
                files: Vec::new(),
                consensus: None,
            },
        }
    }
}

impl ReportWriter for JsonReportWriter {
    fn write_header(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_record(&mut self, record: &DetectionRecord) -> Result<()> {
        self.report.files.push(record.clone());
        Ok(())
    }

    fn write_consensus(&mut self, consensus: &ConsensusInterval) -> Result<()> {
        self.report.consensus = Some(*consensus);
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.report).map_err(|e| {
            Error::JsonWrite {
                path: self.path.clone(),
                source: e,
            }
        })
    }
}
