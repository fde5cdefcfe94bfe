//! Centered short-time power spectrum.

use crate::error::{Error, Result};
use ndarray::Array2;
use realfft::RealFftPlanner;

/// Periodic Hann window of the given length.
pub(crate) fn hann_periodic(size: usize) -> Vec<f32> {
    #[allow(clippy::cast_precision_loss)]
    let n = size as f64;
    (0..size)
        .map(|i| {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            let w = 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / n).cos();
            w as f32
        })
        .collect()
}

/// Number of centered frames produced for a signal of `len` samples.
#[must_use]
pub fn frame_count(len: usize, hop: usize) -> usize {
    1 + len / hop
}

/// Compute `|STFT|^2` with frames centered on `i * hop`.
///
/// The signal is zero-padded by `n_fft / 2` on the left and by the rest
/// of `n_fft` on the right, so every frame fits for odd sizes too. Returns a
/// `[n_fft / 2 + 1, n_frames]` array.
pub fn power_spectrum(samples: &[f32], n_fft: usize, hop: usize) -> Result<Array2<f32>> {
    if n_fft < 2 || hop == 0 {
        return Err(Error::Spectrogram {
            reason: format!("invalid frame geometry n_fft={n_fft} hop={hop}"),
        });
    }

    let pad = n_fft / 2;
    let mut padded = vec![0.0f32; samples.len() + n_fft];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    let n_frames = frame_count(samples.len(), hop);
    let n_bins = n_fft / 2 + 1;
    let window = hann_periodic(n_fft);

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let mut input = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();

    let mut power = Array2::<f32>::zeros((n_bins, n_frames));
    for frame in 0..n_frames {
        let start = frame * hop;
        let segment = &padded[start..start + n_fft];
        for ((dst, &s), &w) in input.iter_mut().zip(segment).zip(&window) {
            *dst = s * w;
        }

        fft.process(&mut input, &mut spectrum)
            .map_err(|e| Error::Spectrogram {
                reason: e.to_string(),
            })?;

        for (bin, c) in spectrum.iter().enumerate() {
            power[[bin, frame]] = c.norm_sqr();
        }
    }

    Ok(power)
}
