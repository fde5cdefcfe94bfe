//! Mel-scaled decibel spectrograms.
//!
//! Turns mono audio at the analysis sample rate into a
//! `[n_mels, n_frames]` dB matrix referenced to the loudest point of the
//! same file, plus the center time of every frame.

mod mel;
mod render;
mod stft;

pub use mel::{hz_to_mel, mel_filterbank, mel_to_hz};
pub use render::render_spectrogram_png;
pub use stft::{frame_count, power_spectrum};

use crate::constants::spectrogram as defaults;
use crate::error::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Spectral transform settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpectrogramParams {
    /// Analysis sample rate in Hz.
    pub sample_rate: u32,
    /// FFT window length in samples.
    pub n_fft: usize,
    /// Hop length in samples.
    pub hop_length: usize,
    /// Number of mel bands.
    pub n_mels: usize,
    /// Upper mel filterbank bound in Hz.
    pub fmax: f32,
    /// Dynamic range floor below the peak, in dB.
    pub top_db: f32,
}

impl Default for SpectrogramParams {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            n_fft: defaults::N_FFT,
            hop_length: defaults::HOP_LENGTH,
            n_mels: defaults::N_MELS,
            fmax: defaults::FMAX,
            top_db: defaults::TOP_DB,
        }
    }
}

/// A dB mel spectrogram paired with its time axis.
///
/// Column `i` of [`Spectrogram::db`] is centered at `times()[i]`.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    db: Array2<f32>,
    times: Vec<f64>,
}

impl Spectrogram {
    /// Assemble a spectrogram from a `[bands, frames]` matrix and frame times.
    ///
    /// Fails if the time axis length differs from the frame count or the
    /// times are not strictly increasing.
    pub fn from_parts(db: Array2<f32>, times: Vec<f64>) -> Result<Self> {
        if db.ncols() != times.len() {
            return Err(Error::Spectrogram {
                reason: format!(
                    "time axis has {} entries for {} frames",
                    times.len(),
                    db.ncols()
                ),
            });
        }
        if times.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(Error::Spectrogram {
                reason: "time axis is not strictly increasing".to_string(),
            });
        }
        Ok(Self { db, times })
    }

    /// dB values, shape `[n_mels, n_frames]`.
    #[must_use]
    pub fn db(&self) -> &Array2<f32> {
        &self.db
    }

    /// Frame center times in seconds.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of mel bands.
    #[must_use]
    pub fn n_bands(&self) -> usize {
        self.db.nrows()
    }

    /// Number of time frames.
    #[must_use]
    pub fn n_frames(&self) -> usize {
        self.db.ncols()
    }

    /// Recording duration as seen by the frame grid.
    ///
    /// `n_frames * frame_step`, or a fixed fallback when there are fewer
    /// than two frames to measure the step from.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        match self.times.as_slice() {
            [first, second, ..] => {
                #[allow(clippy::cast_precision_loss)]
                let frames = self.times.len() as f64;
                frames * (second - first)
            }
            _ => defaults::FALLBACK_DURATION,
        }
    }
}

/// Compute the dB mel spectrogram of mono samples.
///
/// `sample_rate` must already equal `params.sample_rate`; resampling is
/// the caller's job so that band and frame geometry stay reproducible.
pub fn compute_mel_spectrogram(
    samples: &[f32],
    sample_rate: u32,
    params: &SpectrogramParams,
) -> Result<Spectrogram> {
    if samples.is_empty() {
        return Err(Error::EmptyAudio);
    }
    if sample_rate != params.sample_rate {
        return Err(Error::Spectrogram {
            reason: format!(
                "expected {} Hz input, got {sample_rate} Hz",
                params.sample_rate
            ),
        });
    }

    let power = power_spectrum(samples, params.n_fft, params.hop_length)?;
    let filterbank = mel_filterbank(
        sample_rate,
        params.n_fft,
        params.n_mels,
        0.0,
        f64::from(params.fmax),
    );
    let mel_power = filterbank.dot(&power);
    let db = power_to_db(mel_power, params.top_db);

    let times = frame_times(db.ncols(), params.hop_length, sample_rate);
    debug!(
        "Mel spectrogram: {} bands x {} frames",
        db.nrows(),
        db.ncols()
    );
    Spectrogram::from_parts(db, times)
}

/// Convert power to dB relative to the maximum, floored at `max - top_db`.
#[must_use]
pub fn power_to_db(mut power: Array2<f32>, top_db: f32) -> Array2<f32> {
    let peak = power.iter().copied().fold(0.0f32, f32::max);
    let reference = 10.0 * peak.max(defaults::AMIN).log10();

    power.mapv_inplace(|p| 10.0 * p.max(defaults::AMIN).log10() - reference);

    let max_db = power.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let floor = max_db - top_db;
    power.mapv_inplace(|v| v.max(floor));
    power
}

/// Center time of each frame in seconds.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn frame_times(n_frames: usize, hop_length: usize, sample_rate: u32) -> Vec<f64> {
    let step = hop_length as f64 / f64::from(sample_rate);
    (0..n_frames).map(|i| i as f64 * step).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use ndarray::array;

    fn noise(len: usize) -> Vec<f32> {
        // Deterministic LCG noise.
        let mut state: u32 = 12345;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
                #[allow(clippy::cast_precision_loss)]
                let unit = (state >> 8) as f32 / (1u32 << 24) as f32;
                unit * 2.0 - 1.0
            })
            .collect()
    }

    #[test]
    fn test_time_axis_matches_frames_and_increases() {
        let params = SpectrogramParams::default();
        let samples = noise(22050 * 2);
        let spec = compute_mel_spectrogram(&samples, 22050, &params).unwrap();

        assert_eq!(spec.n_bands(), 128);
        assert_eq!(spec.times().len(), spec.n_frames());
        assert_eq!(spec.n_frames(), frame_count(samples.len(), 512));
        assert!(spec.times().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(spec.times()[0], 0.0);
    }

    #[test]
    fn test_peak_is_zero_db_and_floor_is_top_db() {
        let params = SpectrogramParams::default();
        let spec = compute_mel_spectrogram(&noise(22050), 22050, &params).unwrap();

        let max = spec.db().iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let min = spec.db().iter().copied().fold(f32::INFINITY, f32::min);
        assert!(max.abs() < 1e-4);
        assert!(min >= -80.0 - 1e-3);
    }

    #[test]
    fn test_silence_is_flat() {
        let params = SpectrogramParams::default();
        let spec = compute_mel_spectrogram(&vec![0.0; 4096], 22050, &params).unwrap();
        assert!(spec.db().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_rejects_wrong_sample_rate() {
        let params = SpectrogramParams::default();
        let result = compute_mel_spectrogram(&noise(1000), 44100, &params);
        assert!(matches!(result, Err(Error::Spectrogram { .. })));
    }

    #[test]
    fn test_rejects_empty_input() {
        let params = SpectrogramParams::default();
        let result = compute_mel_spectrogram(&[], 22050, &params);
        assert!(matches!(result, Err(Error::EmptyAudio)));
    }

    #[test]
    fn test_power_to_db_reference_is_max() {
        let db = power_to_db(array![[1.0, 0.1], [0.01, 1e-12]], 80.0);
        assert!((db[[0, 0]] - 0.0).abs() < 1e-5);
        assert!((db[[0, 1]] + 10.0).abs() < 1e-4);
        assert!((db[[1, 0]] + 20.0).abs() < 1e-4);
        assert!((db[[1, 1]] + 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_from_parts_rejects_mismatched_axis() {
        let result = Spectrogram::from_parts(Array2::zeros((4, 3)), vec![0.0, 0.1]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_parts_rejects_non_increasing_axis() {
        let result = Spectrogram::from_parts(Array2::zeros((4, 3)), vec![0.0, 0.2, 0.2]);
        assert!(result.is_err());
    }

    #[test]
    fn test_duration_uses_frame_step() {
        let times = frame_times(4, 512, 22050);
        let spec = Spectrogram::from_parts(Array2::zeros((2, 4)), times).unwrap();
        assert!((spec.duration_secs() - 4.0 * 512.0 / 22050.0).abs() < 1e-12);

        let single = Spectrogram::from_parts(Array2::zeros((2, 1)), vec![0.0]).unwrap();
        assert_eq!(single.duration_secs(), 12.0);
    }
}
