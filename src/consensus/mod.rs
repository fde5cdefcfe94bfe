//! Batch-level consensus over per-file click detections.

use crate::constants::consensus as defaults;
use crate::detect::{DetectedInterval, Detection};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One file's contribution to the consensus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsensusInput {
    /// Detected interval, or `None` when detection failed.
    pub interval: Option<DetectedInterval>,
    /// Optional confidence weight attached to the detection.
    ///
    /// Accepted for callers that track detection confidence; the
    /// aggregate is currently an unweighted mean and ignores it.
    pub weight: Option<f64>,
}

impl ConsensusInput {
    /// Build an unweighted input from a detector outcome.
    #[must_use]
    pub fn from_detection(detection: &Detection) -> Self {
        Self {
            interval: detection.interval(),
            weight: None,
        }
    }
}

impl From<DetectedInterval> for ConsensusInput {
    fn from(interval: DetectedInterval) -> Self {
        Self {
            interval: Some(interval),
            weight: None,
        }
    }
}

/// Consensus settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConsensusParams {
    /// Start used when nothing valid was detected.
    pub default_start: f64,
    /// End used when nothing valid was detected.
    pub default_end: f64,
    /// Decimal places kept in the result.
    pub decimals: u32,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            default_start: defaults::DEFAULT_START,
            default_end: defaults::DEFAULT_END,
            decimals: defaults::DECIMALS,
        }
    }
}

/// The batch's representative click interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConsensusInterval {
    /// Start in seconds, rounded.
    pub start: f64,
    /// End in seconds, rounded.
    pub end: f64,
    /// Number of detections that contributed.
    pub contributors: usize,
    /// Whether the default interval was used because nothing contributed.
    pub is_default: bool,
}

/// Round half-to-even at the given number of decimals.
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX).min(15));
    (value * factor).round_ties_even() / factor
}

/// Combine per-file detections into one interval.
///
/// Absent intervals are dropped. With nothing left, the configured
/// default is returned; otherwise starts and ends are averaged
/// independently and rounded.
#[must_use]
pub fn consensus(inputs: &[ConsensusInput], params: &ConsensusParams) -> ConsensusInterval {
    let valid: Vec<DetectedInterval> = inputs.iter().filter_map(|i| i.interval).collect();

    if valid.is_empty() {
        debug!("No valid detections, using default interval");
        return ConsensusInterval {
            start: params.default_start,
            end: params.default_end,
            contributors: 0,
            is_default: true,
        };
    }

    #[allow(clippy::cast_precision_loss)]
    let n = valid.len() as f64;
    let mean_start = valid.iter().map(DetectedInterval::start).sum::<f64>() / n;
    let mean_end = valid.iter().map(DetectedInterval::end).sum::<f64>() / n;

    ConsensusInterval {
        start: round_to(mean_start, params.decimals),
        end: round_to(mean_end, params.decimals),
        contributors: valid.len(),
        is_default: false,
    }
}
