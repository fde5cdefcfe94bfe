//! Switch-click detection on mel spectrograms.
//!
//! A mechanical switch shows up as a short, broadband burst: a vertical
//! band spanning many mel bands over only a few frames. The detector cuts
//! the coarse search window out of the spectrogram, turns it into an
//! 8-bit image, keeps what survives blurring, Otsu binarization and an
//! opening with a tall one-column kernel, and maps the dominant region's
//! horizontal extent back to seconds.

pub mod imaging;
mod regions;

pub use regions::{Region, dominant_region, find_regions};

use crate::constants::detection as defaults;
use crate::spectral::Spectrogram;
use image::GrayImage;
use imaging::RectKernel;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A time interval with `start < end`, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectedInterval {
    start: f64,
    end: f64,
}

impl DetectedInterval {
    /// Create an interval, or `None` unless both bounds are finite and
    /// `start < end`.
    #[must_use]
    pub fn new(start: f64, end: f64) -> Option<Self> {
        (start.is_finite() && end.is_finite() && start < end).then_some(Self { start, end })
    }

    /// Start in seconds.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// End in seconds.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Length in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Outcome of running the detector on one spectrogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Detection {
    /// A click region was found and clamped to plausible bounds.
    Refined(DetectedInterval),
    /// Nothing could be refined; the coarse window is returned as is.
    Fallback(DetectedInterval),
    /// The coarse window collapsed to zero width on the frame grid.
    NoDetection,
}

impl Detection {
    /// The interval carried by this outcome, if any.
    #[must_use]
    pub fn interval(&self) -> Option<DetectedInterval> {
        match *self {
            Self::Refined(interval) | Self::Fallback(interval) => Some(interval),
            Self::NoDetection => None,
        }
    }

    /// Short label for reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Refined(_) => "refined",
            Self::Fallback(_) => "fallback",
            Self::NoDetection => "none",
        }
    }
}

/// Click detector settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorParams {
    /// Coarse search window start in seconds.
    pub window_start: f64,
    /// Coarse search window end in seconds.
    pub window_end: f64,
    /// Gaussian blur kernel size (1, 3, 5 or 7).
    pub blur_kernel: usize,
    /// Structuring element width in frames.
    pub kernel_width: usize,
    /// Structuring element height in mel bands.
    pub kernel_height: usize,
    /// Lower clamp for the detected start.
    pub min_start: f64,
    /// Upper clamp for the detected start.
    pub max_start: f64,
    /// Minimum click duration enforced on the detected end.
    pub min_duration: f64,
    /// Upper clamp for the detected end.
    pub max_end: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            window_start: defaults::WINDOW_START,
            window_end: defaults::WINDOW_END,
            blur_kernel: defaults::BLUR_KERNEL,
            kernel_width: 1,
            kernel_height: defaults::KERNEL_HEIGHT,
            min_start: defaults::MIN_START,
            max_start: defaults::MAX_START,
            min_duration: defaults::MIN_DURATION,
            max_end: defaults::MAX_END,
        }
    }
}

impl DetectorParams {
    /// The coarse search window, if it is a valid interval.
    #[must_use]
    pub fn window(&self) -> Option<DetectedInterval> {
        DetectedInterval::new(self.window_start, self.window_end)
    }

    /// Override the coarse window.
    #[must_use]
    pub fn with_window(mut self, start: f64, end: f64) -> Self {
        self.window_start = start;
        self.window_end = end;
        self
    }

    fn kernel(&self) -> RectKernel {
        RectKernel {
            width: self.kernel_width.max(1),
            height: self.kernel_height.max(1),
        }
    }

    /// Clamp detected bounds into the physically plausible range.
    fn clamp(&self, start: f64, end: f64) -> Option<DetectedInterval> {
        let start = start.min(self.max_start).max(self.min_start);
        let end = end.min(self.max_end).max(start + self.min_duration);
        DetectedInterval::new(start, end)
    }
}

/// Index of the frame time closest to `target` (first one on ties).
#[must_use]
pub fn nearest_frame(times: &[f64], target: f64) -> Option<usize> {
    times
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &t)| {
            let distance = (t - target).abs();
            match best {
                Some((_, d)) if d <= distance => best,
                _ => Some((i, distance)),
            }
        })
        .map(|(i, _)| i)
}

/// Column range `[start, end)` of the coarse window on the frame grid.
///
/// `None` when the window resolves to zero or negative width.
#[must_use]
pub fn window_columns(times: &[f64], window: DetectedInterval) -> Option<(usize, usize)> {
    let start = nearest_frame(times, window.start())?;
    let end = nearest_frame(times, window.end())?;
    (start < end).then_some((start, end))
}

/// Binary mask of vertical high-energy structure in a grayscale ROI.
///
/// Returns `None` if the blur kernel size is unsupported.
#[must_use]
pub fn vertical_structure_mask(roi: &GrayImage, params: &DetectorParams) -> Option<GrayImage> {
    let blurred = imaging::gaussian_blur(roi, params.blur_kernel)?;
    let level = imaging::otsu_level(&blurred);
    let binary = imaging::threshold_binary(&blurred, level);
    debug!("Otsu threshold level {level}");
    Some(imaging::open(&binary, params.kernel()))
}

/// Locate the switch click inside the coarse window of a spectrogram.
///
/// Never fails: anything that prevents refinement yields
/// [`Detection::Fallback`] with the coarse window, and a window that
/// collapses on the frame grid yields [`Detection::NoDetection`].
#[must_use]
pub fn detect_click(spectrogram: &Spectrogram, params: &DetectorParams) -> Detection {
    let Some(window) = params.window() else {
        warn!(
            "Coarse window {:.2}-{:.2}s is not a valid interval",
            params.window_start, params.window_end
        );
        return Detection::NoDetection;
    };

    let times = spectrogram.times();
    let Some((start_idx, end_idx)) = window_columns(times, window) else {
        debug!("Coarse window collapses on the frame grid");
        return Detection::NoDetection;
    };

    let roi = spectrogram
        .db()
        .slice(ndarray::s![.., start_idx..end_idx]);
    let Some(gray) = imaging::normalize_to_u8(roi) else {
        warn!("Spectrogram window contains non-finite values, keeping coarse window");
        return Detection::Fallback(window);
    };

    let Some(mask) = vertical_structure_mask(&gray, params) else {
        warn!(
            "Unsupported blur kernel size {}, keeping coarse window",
            params.blur_kernel
        );
        return Detection::Fallback(window);
    };

    let regions = find_regions(&mask);
    let Some(region) = dominant_region(&regions) else {
        debug!("No vertical structure found, keeping coarse window");
        return Detection::Fallback(window);
    };

    let x = start_idx + region.min_x as usize;
    let x_end = x + region.width() as usize;
    let (Some(&raw_start), Some(&raw_end)) = (times.get(x), times.get(x_end)) else {
        warn!("Region maps outside the time axis, keeping coarse window");
        return Detection::Fallback(window);
    };

    debug!(
        "{} candidate region(s); dominant area {} spans {:.3}-{:.3}s",
        regions.len(),
        region.area,
        raw_start,
        raw_end
    );

    params
        .clamp(raw_start, raw_end)
        .map_or(Detection::Fallback(window), Detection::Refined)
}
