//! Batch ownership and cancellation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local};

use crate::consensus::{ConsensusInput, ConsensusInterval, ConsensusParams, consensus};
use crate::detect::{DetectedInterval, Detection};
use crate::spectral::Spectrogram;

/// Shared flag set when the operator interrupts a run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a previous request before starting new work.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Where a file stands in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Collected but not analyzed.
    Pending,
    /// Decoded and run through the detector.
    Analyzed,
    /// Decoding or transforming failed.
    DecodeFailed(String),
}

impl FileStatus {
    /// Short label for reports.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Analyzed => "analyzed",
            Self::DecodeFailed(_) => "decode failed",
        }
    }

    /// Whether the file can be split.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !matches!(self, Self::DecodeFailed(_))
    }
}

/// One input file and what was learned about it.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    /// Source path.
    pub path: PathBuf,
    /// Display name (file name).
    pub name: String,
    /// Mel spectrogram, when analysis ran.
    pub spectrogram: Option<Spectrogram>,
    /// Detector outcome.
    pub detection: Detection,
    /// Interval shown to the operator for this file.
    ///
    /// The detected interval, or the coarse window when nothing was
    /// detected.
    pub reported: Option<DetectedInterval>,
    /// Duration derived from the time axis, in seconds.
    pub duration_secs: Option<f64>,
    /// Processing status.
    pub status: FileStatus,
    /// Rendered spectrogram image, if one was written.
    pub image_path: Option<PathBuf>,
}

impl BatchEntry {
    /// An entry that has not been analyzed.
    #[must_use]
    pub fn pending(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            name: display_name(path),
            spectrogram: None,
            detection: Detection::NoDetection,
            reported: None,
            duration_secs: None,
            status: FileStatus::Pending,
            image_path: None,
        }
    }

    /// An entry whose decoding or transform failed.
    #[must_use]
    pub fn failed(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            status: FileStatus::DecodeFailed(reason.into()),
            ..Self::pending(path)
        }
    }

    /// File stem used to name split outputs.
    #[must_use]
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map_or_else(|| "audio".to_string(), |s| s.to_string_lossy().into_owned())
    }

    /// This entry's contribution to the consensus.
    ///
    /// Failed files contribute nothing.
    #[must_use]
    pub fn consensus_input(&self) -> ConsensusInput {
        match self.status {
            FileStatus::Analyzed => ConsensusInput::from_detection(&self.detection),
            _ => ConsensusInput {
                interval: None,
                weight: None,
            },
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}

/// The files of one run, tagged with the generation that produced them.
#[derive(Debug, Clone)]
pub struct Batch {
    generation: u64,
    created: DateTime<Local>,
    entries: Vec<BatchEntry>,
}

impl Batch {
    /// An empty batch of the given generation.
    #[must_use]
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            created: Local::now(),
            entries: Vec::new(),
        }
    }

    /// Generation number this batch belongs to.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the batch was started.
    #[must_use]
    pub fn created(&self) -> DateTime<Local> {
        self.created
    }

    /// Entries in input order.
    #[must_use]
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: BatchEntry) {
        self.entries.push(entry);
    }

    /// Consensus interval over this batch's detections.
    #[must_use]
    pub fn consensus(&self, params: &ConsensusParams) -> ConsensusInterval {
        let inputs: Vec<ConsensusInput> = self
            .entries
            .iter()
            .map(BatchEntry::consensus_input)
            .collect();
        consensus(&inputs, params)
    }
}

/// Owns the current batch and hands out new generations.
#[derive(Debug)]
pub struct BatchDriver {
    current: Batch,
    cancel: CancelToken,
}

impl BatchDriver {
    /// Create a driver with an empty generation-0 batch.
    #[must_use]
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            current: Batch::new(0),
            cancel,
        }
    }

    /// The current batch.
    #[must_use]
    pub fn batch(&self) -> &Batch {
        &self.current
    }

    /// The cancellation token checked between files.
    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Whether `batch` belongs to the current generation.
    #[must_use]
    pub fn is_current(&self, batch: &Batch) -> bool {
        batch.generation == self.current.generation
    }

    /// Replace the current batch with an empty one of the next generation.
    pub fn begin(&mut self) -> u64 {
        let generation = self.current.generation + 1;
        self.current = Batch::new(generation);
        generation
    }

    pub(super) fn current_mut(&mut self) -> &mut Batch {
        &mut self.current
    }

    /// Drop everything collected in the current generation.
    pub(super) fn discard(&mut self) {
        self.current.entries.clear();
    }
}
