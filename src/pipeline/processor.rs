//! Single file analysis.

use crate::audio::{decode_audio_file, to_analysis_rate};
use crate::constants::output::SPECTROGRAM_EXTENSION;
use crate::detect::{DetectorParams, detect_click};
use crate::error::Result;
use crate::pipeline::{BatchEntry, FileStatus};
use crate::spectral::{Spectrogram, SpectrogramParams, compute_mel_spectrogram, render_spectrogram_png};
use crate::splitter::sanitize_filename;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Settings for analyzing files.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Spectral transform settings.
    pub spectrogram: SpectrogramParams,
    /// Click detector settings.
    pub detection: DetectorParams,
    /// Directory for rendered spectrogram images (None = no images).
    pub spectrogram_dir: Option<PathBuf>,
}

/// Decode a file, compute its spectrogram and run the detector.
///
/// Never fails: decode and transform errors are recorded in the
/// returned entry's status so the batch can continue.
pub fn analyze_file(path: &Path, options: &AnalysisOptions) -> BatchEntry {
    let start_time = Instant::now();
    info!("Analyzing: {}", path.display());

    let spectrogram = match spectrogram_for(path, &options.spectrogram) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to analyze {}: {e}", path.display());
            return BatchEntry::failed(path, e.to_string());
        }
    };

    let image_path = options
        .spectrogram_dir
        .as_deref()
        .and_then(|dir| render_image(path, dir, &spectrogram));

    let detection = detect_click(&spectrogram, &options.detection);
    let reported = detection
        .interval()
        .or_else(|| options.detection.window());

    info!(
        "{}: {} click {}",
        path.display(),
        detection.label(),
        reported.map_or_else(
            || "n/a".to_string(),
            |i| format!("{:.2}-{:.2}s", i.start(), i.end())
        )
    );
    debug!(
        "Analyzed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    BatchEntry {
        duration_secs: Some(spectrogram.duration_secs()),
        spectrogram: Some(spectrogram),
        detection,
        reported,
        status: FileStatus::Analyzed,
        image_path,
        ..BatchEntry::pending(path)
    }
}

fn spectrogram_for(path: &Path, params: &SpectrogramParams) -> Result<Spectrogram> {
    let decoded = decode_audio_file(path)?;
    debug!(
        "Decoded {:.1}s at {} Hz",
        decoded.duration_secs, decoded.sample_rate
    );
    let audio = to_analysis_rate(&decoded, params.sample_rate)?;
    compute_mel_spectrogram(&audio.samples, audio.sample_rate, params)
}

/// Image path for a source file inside `dir`.
#[must_use]
pub fn spectrogram_path_for(path: &Path, dir: &Path) -> PathBuf {
    let stem = path.file_stem().map_or_else(
        || std::borrow::Cow::Borrowed("spectrogram"),
        |s| s.to_string_lossy(),
    );
    dir.join(format!("{}{SPECTROGRAM_EXTENSION}", sanitize_filename(&stem)))
}

fn render_image(path: &Path, dir: &Path, spectrogram: &Spectrogram) -> Option<PathBuf> {
    let image_path = spectrogram_path_for(path, dir);
    match render_spectrogram_png(spectrogram, &image_path) {
        Ok(()) => {
            debug!("Wrote spectrogram {}", image_path.display());
            Some(image_path)
        }
        Err(e) => {
            warn!("Failed to render spectrogram for {}: {e}", path.display());
            None
        }
    }
}
