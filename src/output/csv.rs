//! CSV report writer.

use crate::consensus::ConsensusInterval;
use crate::error::{Error, Result};
use crate::output::{DetectionRecord, ReportWriter};
use std::fs::File;
use std::path::{Path, PathBuf};

const HEADER: [&str; 6] = ["File", "Start (s)", "End (s)", "Duration (s)", "Click", "Status"];

/// Label used for the consensus row.
pub const CONSENSUS_ROW: &str = "consensus";

/// CSV report writer.
pub struct CsvReportWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl CsvReportWriter {
    /// Create a new CSV writer.
    pub fn new(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: csv::Writer::from_writer(file),
            path: path.to_path_buf(),
        })
    }

    fn row(&mut self, fields: &[String]) -> Result<()> {
        self.writer
            .write_record(fields)
            .map_err(|e| Error::CsvWrite {
                path: self.path.clone(),
                source: e,
            })
    }
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| format!("{v:.2}"))
}

impl ReportWriter for CsvReportWriter {
    fn write_header(&mut self) -> Result<()> {
        let header: Vec<String> = HEADER.iter().map(ToString::to_string).collect();
        self.row(&header)
    }

    fn write_record(&mut self, record: &DetectionRecord) -> Result<()> {
        self.row(&[
            record.filename.clone(),
            cell(record.start),
            cell(record.end),
            cell(record.duration),
            record.detection.clone(),
            record.status.clone(),
        ])
    }

    fn write_consensus(&mut self, consensus: &ConsensusInterval) -> Result<()> {
        let status = if consensus.is_default {
            "default".to_string()
        } else {
            format!("{} file(s)", consensus.contributors)
        };
        self.row(&[
            CONSENSUS_ROW.to_string(),
            cell(Some(consensus.start)),
            cell(Some(consensus.end)),
            String::new(),
            String::new(),
            status,
        ])
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
