//! Click excision and half splitting.
//!
//! The confirmed click interval is removed from the recording and what
//! remains is divided into two contiguous halves by sample count.

mod summary;
mod writer;

pub use summary::{SplitOptions, SplitResult, SplitSummary};
pub use writer::{SegmentNames, SegmentWriter, SplitOutputs, sanitize_filename};

use crate::audio::DecodedAudio;
use crate::error::{Error, Result};

/// Which half of a recording a segment holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentRole {
    /// Audio before the midpoint of the excised recording.
    First,
    /// Audio from the midpoint to the end.
    Second,
}

impl SegmentRole {
    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::First => "first half",
            Self::Second => "second half",
        }
    }
}

impl std::fmt::Display for SegmentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The two halves of one recording after excision.
#[derive(Debug, Clone)]
pub struct SplitHalves {
    /// Samples before the midpoint.
    pub first: Vec<f32>,
    /// Samples from the midpoint on.
    pub second: Vec<f32>,
    /// Sample rate shared by both halves.
    pub sample_rate: u32,
}

impl SplitHalves {
    /// Samples of the given half.
    #[must_use]
    pub fn samples(&self, role: SegmentRole) -> &[f32] {
        match role {
            SegmentRole::First => &self.first,
            SegmentRole::Second => &self.second,
        }
    }
}

fn rejected(start: f64, end: f64, reason: impl Into<String>) -> Error {
    Error::IntervalValidation {
        start,
        end,
        reason: reason.into(),
    }
}

/// Check the shape of an interval independent of any buffer.
///
/// Rejects non-finite, negative and inverted (or empty) intervals.
pub fn validate_interval(start: f64, end: f64) -> Result<()> {
    if !start.is_finite() || !end.is_finite() {
        return Err(rejected(start, end, "bounds must be finite"));
    }
    if start >= end {
        return Err(rejected(start, end, "start must be before end"));
    }
    if start < 0.0 {
        return Err(rejected(start, end, "start is before the beginning of the audio"));
    }
    Ok(())
}

/// Convert an interval in seconds to sample cut points `(a, b)`.
///
/// Bounds are rounded to the nearest sample. Nothing is clamped: an
/// interval extending past `len` samples is an error.
pub fn cut_points(len: usize, sample_rate: u32, start: f64, end: f64) -> Result<(usize, usize)> {
    validate_interval(start, end)?;
    if sample_rate == 0 {
        return Err(rejected(start, end, "sample rate is zero"));
    }

    let rate = f64::from(sample_rate);
    #[allow(clippy::cast_precision_loss)]
    let len_f = len as f64;
    let (a, b) = ((start * rate).round(), (end * rate).round());
    if b > len_f {
        return Err(rejected(
            start,
            end,
            format!(
                "end is past the end of the audio ({:.3}s)",
                len_f / rate
            ),
        ));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let points = (a as usize, b as usize);
    Ok(points)
}

/// Remove samples `[a, b)` and join what is left.
///
/// # Panics
///
/// Panics if `a > b` or `b > samples.len()`; use [`cut_points`] to
/// obtain valid indices.
#[must_use]
pub fn excise(samples: &[f32], a: usize, b: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(samples.len() - (b - a));
    out.extend_from_slice(&samples[..a]);
    out.extend_from_slice(&samples[b..]);
    out
}

/// Split at `len / 2`; an odd leftover sample goes to the second half.
#[must_use]
pub fn split_halves(samples: &[f32]) -> (&[f32], &[f32]) {
    samples.split_at(samples.len() / 2)
}

/// Excise `[start, end)` seconds from the audio and split the rest.
pub fn split_audio(audio: &DecodedAudio, start: f64, end: f64) -> Result<SplitHalves> {
    let (a, b) = cut_points(audio.samples.len(), audio.sample_rate, start, end)?;
    let remaining = excise(&audio.samples, a, b);
    let (first, second) = split_halves(&remaining);
    Ok(SplitHalves {
        first: first.to_vec(),
        second: second.to_vec(),
        sample_rate: audio.sample_rate,
    })
}
