//! WAV output for split halves.
//!
//! Each half is written into its own subdirectory of the run directory.

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};

use super::{SegmentRole, SplitHalves};
use crate::Error;
use crate::constants::output;

/// Directory and filename suffix for each half.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SegmentNames {
    /// Subdirectory for the first half.
    pub first_dir: String,
    /// Subdirectory for the second half.
    pub second_dir: String,
    /// Filename suffix for the first half.
    pub first_suffix: String,
    /// Filename suffix for the second half.
    pub second_suffix: String,
}

impl Default for SegmentNames {
    fn default() -> Self {
        Self {
            first_dir: output::FIRST_DIR.to_string(),
            second_dir: output::SECOND_DIR.to_string(),
            first_suffix: output::FIRST_SUFFIX.to_string(),
            second_suffix: output::SECOND_SUFFIX.to_string(),
        }
    }
}

impl SegmentNames {
    fn dir(&self, role: SegmentRole) -> &str {
        match role {
            SegmentRole::First => &self.first_dir,
            SegmentRole::Second => &self.second_dir,
        }
    }

    fn suffix(&self, role: SegmentRole) -> &str {
        match role {
            SegmentRole::First => &self.first_suffix,
            SegmentRole::Second => &self.second_suffix,
        }
    }
}

/// Paths of the two files written for one recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutputs {
    /// First-half WAV.
    pub first: PathBuf,
    /// Second-half WAV.
    pub second: PathBuf,
}

/// Writes split halves under a run directory.
#[derive(Debug, Clone)]
pub struct SegmentWriter {
    run_dir: PathBuf,
    names: SegmentNames,
}

impl SegmentWriter {
    /// Create a writer rooted at `run_dir`.
    #[must_use]
    pub fn new(run_dir: PathBuf, names: SegmentNames) -> Self {
        Self { run_dir, names }
    }

    /// Output path for one half of the recording named `stem`.
    #[must_use]
    pub fn path_for(&self, stem: &str, role: SegmentRole) -> PathBuf {
        let stem = sanitize_filename(stem);
        self.run_dir
            .join(self.names.dir(role))
            .join(format!("{stem}_{}.wav", self.names.suffix(role)))
    }

    /// Write both halves of `stem`.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created or a file
    /// cannot be written.
    pub fn write_halves(&self, stem: &str, halves: &SplitHalves) -> Result<SplitOutputs, Error> {
        let first = self.write_half(stem, SegmentRole::First, halves)?;
        let second = self.write_half(stem, SegmentRole::Second, halves)?;
        Ok(SplitOutputs { first, second })
    }

    fn write_half(
        &self,
        stem: &str,
        role: SegmentRole,
        halves: &SplitHalves,
    ) -> Result<PathBuf, Error> {
        let path = self.path_for(stem, role);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| Error::OutputDirCreateFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        write_wav_file(&path, halves.samples(role), halves.sample_rate)?;
        Ok(path)
    }
}

/// Sanitize a string for use as a filename.
///
/// Replaces characters that are invalid in filenames across platforms
/// and prevents path traversal.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    sanitized.replace("..", "__")
}

/// Full-scale magnitude of 16-bit PCM, matching how the decoder normalizes.
const PCM16_SCALE: f32 = 32768.0;

/// Convert a normalized sample to 16-bit PCM.
///
/// Decoded 16-bit input maps back to its original value.
fn to_pcm16(sample: f32) -> i16 {
    #[allow(clippy::cast_possible_truncation)]
    let pcm = (sample * PCM16_SCALE)
        .round()
        .clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
    pcm
}

/// Write mono samples as 16-bit PCM.
fn write_wav_file(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let wav_err = |e: hound::Error| Error::WavWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = WavWriter::create(path, spec).map_err(wav_err)?;
    for &sample in samples {
        writer.write_sample(to_pcm16(sample)).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)
}
