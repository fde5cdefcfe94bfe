//! Detection report for a batch.

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::consensus::{ConsensusInterval, ConsensusParams, round_to};
use crate::pipeline::{Batch, BatchEntry, FileStatus};

const DISPLAY_DECIMALS: u32 = 2;

/// One row of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRecord {
    /// File name.
    pub filename: String,
    /// Reported start in seconds.
    pub start: Option<f64>,
    /// Reported end in seconds.
    pub end: Option<f64>,
    /// Audio duration in seconds.
    pub duration: Option<f64>,
    /// Detector outcome label.
    pub detection: String,
    /// Processing status, with the reason for failures.
    pub status: String,
}

impl DetectionRecord {
    /// Build a record from a batch entry, rounding for display.
    #[must_use]
    pub fn from_entry(entry: &BatchEntry) -> Self {
        let rounded = |v: f64| round_to(v, DISPLAY_DECIMALS);
        let status = match &entry.status {
            FileStatus::DecodeFailed(reason) => {
                format!("{}: {reason}", entry.status.label())
            }
            other => other.label().to_string(),
        };
        Self {
            filename: entry.name.clone(),
            start: entry.reported.map(|i| rounded(i.start())),
            end: entry.reported.map(|i| rounded(i.end())),
            duration: entry.duration_secs.map(rounded),
            detection: entry.detection.label().to_string(),
            status,
        }
    }
}

/// Per-file records plus the batch consensus.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Batch generation.
    pub generation: u64,
    /// When the batch was started.
    pub created: DateTime<Local>,
    /// Rows in batch order.
    pub records: Vec<DetectionRecord>,
    /// Consensus over the batch.
    pub consensus: ConsensusInterval,
}

impl BatchReport {
    /// Summarize a batch.
    #[must_use]
    pub fn from_batch(batch: &Batch, params: &ConsensusParams) -> Self {
        Self {
            generation: batch.generation(),
            created: batch.created(),
            records: batch.entries().iter().map(DetectionRecord::from_entry).collect(),
            consensus: batch.consensus(params),
        }
    }

    /// Print the report as a table through the log.
    pub fn log_table(&self) {
        let width = self
            .records
            .iter()
            .map(|r| r.filename.chars().count())
            .max()
            .unwrap_or(0)
            .max("File".len());

        info!(
            "{:<width$}  {:>8}  {:>8}  {:>9}  {:<8}  Status",
            "File", "Start", "End", "Duration", "Click"
        );
        for r in &self.records {
            info!(
                "{:<width$}  {:>8}  {:>8}  {:>9}  {:<8}  {}",
                r.filename,
                seconds(r.start),
                seconds(r.end),
                seconds(r.duration),
                r.detection,
                r.status
            );
        }

        let c = &self.consensus;
        if c.is_default {
            info!(
                "Consensus: {:.2}-{:.2}s (default, no usable detections)",
                c.start, c.end
            );
        } else {
            info!(
                "Consensus: {:.2}-{:.2}s from {} file(s)",
                c.start, c.end, c.contributors
            );
        }
    }
}

fn seconds(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::detect::{DetectedInterval, Detection};
    use std::path::Path;

    fn sample_batch() -> Batch {
        let mut batch = Batch::new(3);
        let interval = DetectedInterval::new(5.4321, 6.2468).unwrap();
        batch.push(BatchEntry {
            detection: Detection::Refined(interval),
            reported: Some(interval),
            duration_secs: Some(12.005),
            status: FileStatus::Analyzed,
            ..BatchEntry::pending(Path::new("/data/a.wav"))
        });
        batch.push(BatchEntry::failed(Path::new("/data/b.wav"), "bad header"));
        batch
    }

    #[test]
    fn test_records_are_rounded() {
        let report = BatchReport::from_batch(&sample_batch(), &ConsensusParams::default());
        let first = &report.records[0];
        assert_eq!(first.filename, "a.wav");
        assert_eq!(first.start, Some(5.43));
        assert_eq!(first.end, Some(6.25));
        assert_eq!(first.detection, "refined");
        assert_eq!(first.status, "analyzed");
    }

    #[test]
    fn test_failed_record_carries_reason() {
        let report = BatchReport::from_batch(&sample_batch(), &ConsensusParams::default());
        let failed = &report.records[1];
        assert_eq!(failed.start, None);
        assert_eq!(failed.status, "decode failed: bad header");
        assert_eq!(report.consensus.contributors, 1);
        assert_eq!(report.generation, 3);
    }

    #[test]
    fn test_seconds_formatting() {
        assert_eq!(seconds(Some(5.5)), "5.50");
        assert_eq!(seconds(None), "-");
    }
}
