//! Slaney-style mel filterbank.
//!
//! The mel scale is linear below 1 kHz and logarithmic above it, and each
//! triangular filter is area-normalized so that bands of different widths
//! carry comparable energy.

use ndarray::Array2;

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Convert a frequency in Hz to mels.
#[must_use]
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Convert mels back to Hz.
#[must_use]
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Build a `[n_mels, n_fft / 2 + 1]` filterbank matrix.
#[must_use]
pub fn mel_filterbank(
    sample_rate: u32,
    n_fft: usize,
    n_mels: usize,
    fmin: f64,
    fmax: f64,
) -> Array2<f32> {
    let n_bins = n_fft / 2 + 1;
    let nyquist = f64::from(sample_rate) / 2.0;

    #[allow(clippy::cast_precision_loss)]
    let fft_freqs: Vec<f64> = (0..n_bins)
        .map(|i| nyquist * i as f64 / (n_bins - 1).max(1) as f64)
        .collect();

    let mel_min = hz_to_mel(fmin);
    let mel_max = hz_to_mel(fmax);
    let edges = n_mels + 2;
    #[allow(clippy::cast_precision_loss)]
    let mel_points: Vec<f64> = (0..edges)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f64 / (edges - 1) as f64))
        .collect();

    let mut weights = Array2::<f32>::zeros((n_mels, n_bins));
    for band in 0..n_mels {
        let lo = mel_points[band];
        let center = mel_points[band + 1];
        let hi = mel_points[band + 2];
        let norm = 2.0 / (hi - lo);

        for (bin, &f) in fft_freqs.iter().enumerate() {
            let rising = (f - lo) / (center - lo);
            let falling = (hi - f) / (hi - center);
            let w = rising.min(falling).max(0.0);
            if w > 0.0 {
                #[allow(clippy::cast_possible_truncation)]
                {
                    weights[[band, bin]] = (w * norm) as f32;
                }
            }
        }
    }

    weights
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mel_scale_is_linear_below_1khz() {
        assert!((hz_to_mel(500.0) - 7.5).abs() < 1e-9);
        assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_mel_round_trip() {
        for hz in [0.0, 250.0, 999.0, 1000.0, 4000.0, 8000.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 1e-6);
        }
    }

    #[test]
    fn test_filterbank_shape_and_coverage() {
        let fb = mel_filterbank(22050, 2048, 128, 0.0, 8000.0);
        assert_eq!(fb.dim(), (128, 1025));

        // Every band has at least one non-zero weight.
        for row in fb.rows() {
            assert!(row.iter().any(|&w| w > 0.0));
        }

        // Nothing above fmax: 8000 Hz is bin ~743 at 22050/2048.
        let above = fb.column(800);
        assert!(above.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_filterbank_weights_non_negative() {
        let fb = mel_filterbank(22050, 2048, 128, 0.0, 8000.0);
        assert!(fb.iter().all(|&w| w >= 0.0));
    }
}
