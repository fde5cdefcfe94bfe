//! Audio resampling using rubato.

use crate::audio::DecodedAudio;
use crate::error::{Error, Result};
use audioadapter_buffers::direct::SequentialSlice;
use rubato::{Fft, FixedSync, Resampler};
use tracing::debug;

const CHUNK_SIZE: usize = 1024;

/// Resample mono audio to the target sample rate.
///
/// Returns the input unchanged if already at the target rate.
pub fn resample(samples: Vec<f32>, from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate {
        return Ok(samples);
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(Error::Resample {
            reason: format!("invalid sample rates {from_rate} -> {to_rate}"),
        });
    }

    let mut resampler = Fft::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        1,
        1,
        FixedSync::Both,
    )
    .map_err(|e| Error::Resample {
        reason: e.to_string(),
    })?;

    let frames_in = resampler.input_frames_next();
    let expected = expected_output_len(samples.len(), from_rate, to_rate);
    let mut output = Vec::with_capacity(expected + CHUNK_SIZE);

    let mut blocks = samples.chunks_exact(frames_in);
    for block in blocks.by_ref() {
        output.extend_from_slice(&process_block(&mut resampler, block)?);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut padded = tail.to_vec();
        padded.resize(frames_in, 0.0);
        output.extend_from_slice(&process_block(&mut resampler, &padded)?);
    }

    // Padding of the last block produces extra frames past the real signal.
    output.truncate(expected);
    Ok(output)
}

/// Bring decoded audio to the analysis sample rate.
pub fn to_analysis_rate(audio: &DecodedAudio, target_rate: u32) -> Result<DecodedAudio> {
    if audio.sample_rate == target_rate {
        return Ok(audio.clone());
    }
    debug!(
        "Resampling from {} Hz to {} Hz...",
        audio.sample_rate, target_rate
    );
    let samples = resample(audio.samples.clone(), audio.sample_rate, target_rate)?;
    Ok(DecodedAudio::new(samples, target_rate))
}

fn process_block(resampler: &mut Fft<f32>, block: &[f32]) -> Result<Vec<f32>> {
    let input = SequentialSlice::new(block, 1, block.len()).map_err(|e| Error::Resample {
        reason: format!("failed to create input adapter: {e}"),
    })?;
    let resampled = resampler
        .process(&input, 0, None)
        .map_err(|e| Error::Resample {
            reason: e.to_string(),
        })?;
    Ok(resampled.take_data())
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn expected_output_len(input_len: usize, from_rate: u32, to_rate: u32) -> usize {
    ((input_len as f64) * f64::from(to_rate) / f64::from(from_rate)).ceil() as usize
}
