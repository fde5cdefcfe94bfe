//! Color-mapped PNG rendering of a spectrogram for visual review.

use crate::constants::output::SPECTROGRAM_SCALE;
use crate::error::{Error, Result};
use crate::spectral::Spectrogram;
use image::{Rgb, RgbImage};
use std::path::Path;

/// Viridis control points, evenly spaced from 0.0 to 1.0.
const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

fn viridis(t: f32) -> Rgb<u8> {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    #[allow(clippy::cast_precision_loss)]
    let scaled = t * (VIRIDIS.len() - 1) as f32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lo = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    #[allow(clippy::cast_precision_loss)]
    let frac = scaled - lo as f32;

    let a = VIRIDIS[lo];
    let b = VIRIDIS[lo + 1];
    let mix = |i: usize| {
        let v = f32::from(a[i]) + (f32::from(b[i]) - f32::from(a[i])) * frac;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let byte = v.round().clamp(0.0, 255.0) as u8;
        byte
    };
    Rgb([mix(0), mix(1), mix(2)])
}

/// Render the spectrogram into an RGB image.
///
/// Low frequencies are at the bottom; each bin is drawn as a square of
/// `SPECTROGRAM_SCALE` pixels. Colors span the file's own dB range.
#[must_use]
pub fn spectrogram_image(spectrogram: &Spectrogram) -> RgbImage {
    let db = spectrogram.db();
    let (bands, frames) = db.dim();

    let min = db.iter().copied().fold(f32::INFINITY, f32::min);
    let max = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;

    let scale = SPECTROGRAM_SCALE;
    #[allow(clippy::cast_possible_truncation)]
    let (width, height) = (frames as u32 * scale, bands as u32 * scale);

    RgbImage::from_fn(width, height, |x, y| {
        let frame = (x / scale) as usize;
        let band = bands - 1 - (y / scale) as usize;
        let value = db[[band, frame]];
        let t = if range > 0.0 { (value - min) / range } else { 0.0 };
        viridis(t)
    })
}

/// Write the spectrogram as a PNG image.
pub fn render_spectrogram_png(spectrogram: &Spectrogram, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::OutputDirCreateFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    spectrogram_image(spectrogram)
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| Error::ImageWrite {
            path: path.to_path_buf(),
            source: e,
        })
}
