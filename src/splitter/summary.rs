//! Per-file and per-run split outcomes.

use std::path::PathBuf;

use chrono::{DateTime, Local};

use super::{SegmentNames, SegmentRole, SplitOutputs};
use crate::constants::output;

/// Settings for splitting a batch.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Root under which the timestamped run directory is created.
    pub output_root: PathBuf,
    /// Directory and suffix naming for the two halves.
    pub names: SegmentNames,
    /// Package the run into a ZIP archive and remove the directory.
    pub zip: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(output::DEFAULT_OUTPUT_DIR),
            names: SegmentNames::default(),
            zip: false,
        }
    }
}

impl SplitOptions {
    /// Run directory for a batch started at `stamp`.
    #[must_use]
    pub fn run_dir(&self, stamp: DateTime<Local>) -> PathBuf {
        self.output_root.join(format!(
            "{}{}",
            output::RUN_DIR_PREFIX,
            stamp.format(output::TIMESTAMP_FORMAT)
        ))
    }

    /// Archive path for a batch started at `stamp`.
    #[must_use]
    pub fn archive_path(&self, stamp: DateTime<Local>) -> PathBuf {
        self.output_root.join(format!(
            "{}{}.zip",
            output::ZIP_PREFIX,
            stamp.format(output::TIMESTAMP_FORMAT)
        ))
    }
}

/// What happened to one file during splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitResult {
    /// Both halves were written.
    Written {
        /// Source recording.
        source: PathBuf,
        /// Written segment files.
        outputs: SplitOutputs,
    },
    /// The file could not be split.
    Failed {
        /// Source recording.
        source: PathBuf,
        /// Why it failed.
        reason: String,
    },
}

impl SplitResult {
    /// Path written for `role`, if the split succeeded.
    #[must_use]
    pub fn output(&self, role: SegmentRole) -> Option<&PathBuf> {
        match (self, role) {
            (Self::Written { outputs, .. }, SegmentRole::First) => Some(&outputs.first),
            (Self::Written { outputs, .. }, SegmentRole::Second) => Some(&outputs.second),
            (Self::Failed { .. }, _) => None,
        }
    }

    /// Whether both halves were written.
    #[must_use]
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// Outcome of splitting a whole batch.
#[derive(Debug, Clone)]
pub struct SplitSummary {
    /// Interval that was removed from every file.
    pub start: f64,
    /// End of the removed interval.
    pub end: f64,
    /// Run directory the halves were written to.
    pub run_dir: PathBuf,
    /// Archive the run was packaged into, if requested.
    pub archive: Option<PathBuf>,
    /// Per-file results in batch order.
    pub results: Vec<SplitResult>,
}

impl SplitSummary {
    /// Files split successfully.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.results.iter().filter(|r| r.is_written()).count()
    }

    /// Files that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.processed()
    }
}
