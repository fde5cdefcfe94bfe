//! 8-bit image primitives used by the click detector.
//!
//! Parameterized to reproduce the classic OpenCV pipeline bit for bit:
//! min-max normalization to `u8`, small-kernel Gaussian blur with
//! reflect-101 borders, Otsu binarization and rectangular opening whose
//! border pixels never influence the result.

use image::{GrayImage, Luma};
use ndarray::ArrayView2;

/// Foreground value of binary images.
pub const FOREGROUND: u8 = 255;

/// Linearly rescale values into `0..=255` (min to 0, max to 255).
///
/// Rows of the input become image rows. A constant input maps to all
/// zeros. Returns `None` if any value is not finite.
#[must_use]
pub fn normalize_to_u8(values: ArrayView2<'_, f32>) -> Option<GrayImage> {
    if values.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let (rows, cols) = values.dim();
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let span = f64::from(max) - f64::from(min);
    let scale = if span > f64::EPSILON { 255.0 / span } else { 0.0 };
    let shift = -f64::from(min) * scale;

    #[allow(clippy::cast_possible_truncation)]
    let image = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        let v = f64::from(values[[y as usize, x as usize]]) * scale + shift;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let byte = v.round_ties_even().clamp(0.0, 255.0) as u8;
        Luma([byte])
    });
    Some(image)
}

/// Integer Gaussian taps and their sum for the supported kernel sizes.
///
/// These are the fixed tables used when sigma is derived from the size.
#[must_use]
pub fn gaussian_taps(size: usize) -> Option<(&'static [u32], u32)> {
    match size {
        1 => Some((&[1], 1)),
        3 => Some((&[1, 2, 1], 4)),
        5 => Some((&[1, 4, 6, 4, 1], 16)),
        7 => Some((&[2, 7, 14, 18, 14, 7, 2], 64)),
        _ => None,
    }
}

/// Map an out-of-range index back inside `0..len`, mirroring around the
/// edge pixel without repeating it (`gfedcb|abcdefgh|gfedcba`).
fn reflect_101(index: isize, len: usize) -> usize {
    #[allow(clippy::cast_possible_wrap)]
    let n = len as isize;
    if n <= 1 {
        return 0;
    }
    let mut i = index;
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        }
        if i >= n {
            i = 2 * (n - 1) - i;
        }
    }
    #[allow(clippy::cast_sign_loss)]
    let idx = i as usize;
    idx
}

/// Separable Gaussian blur with a square kernel of `size` taps.
///
/// Returns `None` for unsupported kernel sizes.
#[must_use]
pub fn gaussian_blur(src: &GrayImage, size: usize) -> Option<GrayImage> {
    let (taps, sum) = gaussian_taps(size)?;
    let (width, height) = (src.width() as usize, src.height() as usize);
    if width == 0 || height == 0 {
        return Some(src.clone());
    }

    #[allow(clippy::cast_possible_wrap)]
    let radius = (size / 2) as isize;

    // Horizontal pass kept in integer units of 1/sum.
    let mut rows = vec![0u32; width * height];
    for y in 0..height {
        for x in 0..width {
            #[allow(clippy::cast_possible_wrap)]
            let xi = x as isize;
            let acc: u32 = taps
                .iter()
                .enumerate()
                .map(|(k, &t)| {
                    #[allow(clippy::cast_possible_wrap)]
                    let sx = reflect_101(xi + k as isize - radius, width);
                    #[allow(clippy::cast_possible_truncation)]
                    let p = src.get_pixel(sx as u32, y as u32)[0];
                    t * u32::from(p)
                })
                .sum();
            rows[y * width + x] = acc;
        }
    }

    let denom = sum * sum;
    let mut out = GrayImage::new(src.width(), src.height());
    for y in 0..height {
        #[allow(clippy::cast_possible_wrap)]
        let yi = y as isize;
        for x in 0..width {
            let acc: u32 = taps
                .iter()
                .enumerate()
                .map(|(k, &t)| {
                    #[allow(clippy::cast_possible_wrap)]
                    let sy = reflect_101(yi + k as isize - radius, height);
                    t * rows[sy * width + x]
                })
                .sum();
            let value = (acc + denom / 2) / denom;
            #[allow(clippy::cast_possible_truncation)]
            out.put_pixel(x as u32, y as u32, Luma([value.min(255) as u8]));
        }
    }
    Some(out)
}

/// Otsu threshold: the level maximizing between-class variance.
#[must_use]
pub fn otsu_level(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for p in image.pixels() {
        histogram[usize::from(p[0])] += 1;
    }
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }

    #[allow(clippy::cast_precision_loss)]
    let scale = 1.0 / total as f64;
    #[allow(clippy::cast_precision_loss)]
    let mu: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum::<f64>()
        * scale;

    let eps = f64::from(f32::EPSILON);
    let (mut mu1, mut q1) = (0.0f64, 0.0f64);
    let (mut max_sigma, mut best) = (0.0f64, 0u8);

    for (i, &count) in histogram.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let p_i = count as f64 * scale;
        mu1 *= q1;
        q1 += p_i;
        let q2 = 1.0 - q1;

        if q1.min(q2) < eps || q1.max(q2) > 1.0 - eps {
            continue;
        }

        #[allow(clippy::cast_precision_loss)]
        let level = i as f64;
        mu1 = (mu1 + level * p_i) / q1;
        let mu2 = (mu - q1 * mu1) / q2;
        let sigma = q1 * q2 * (mu1 - mu2) * (mu1 - mu2);
        if sigma > max_sigma {
            max_sigma = sigma;
            #[allow(clippy::cast_possible_truncation)]
            {
                best = i as u8;
            }
        }
    }
    best
}

/// Binarize: pixels strictly above `level` become foreground.
#[must_use]
pub fn threshold_binary(image: &GrayImage, level: u8) -> GrayImage {
    let mut out = image.clone();
    for p in out.pixels_mut() {
        p[0] = if p[0] > level { FOREGROUND } else { 0 };
    }
    out
}

/// Rectangular structuring element anchored at its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectKernel {
    /// Width in columns.
    pub width: usize,
    /// Height in rows.
    pub height: usize,
}

impl RectKernel {
    /// Column offsets covered by the kernel, relative to the anchor.
    fn x_range(self) -> (isize, isize) {
        span(self.width)
    }

    /// Row offsets covered by the kernel, relative to the anchor.
    fn y_range(self) -> (isize, isize) {
        span(self.height)
    }
}

#[allow(clippy::cast_possible_wrap)]
fn span(len: usize) -> (isize, isize) {
    let anchor = (len / 2) as isize;
    (-anchor, len as isize - 1 - anchor)
}

fn morph(src: &GrayImage, kernel: RectKernel, pick: fn(u8, u8) -> u8, init: u8) -> GrayImage {
    let (width, height) = (src.width(), src.height());
    let (x0, x1) = kernel.x_range();
    let (y0, y1) = kernel.y_range();
    #[allow(clippy::cast_possible_wrap)]
    let (w, h) = (width as isize, height as isize);

    GrayImage::from_fn(width, height, |x, y| {
        let mut acc = init;
        for dy in y0..=y1 {
            let sy = y as isize + dy;
            if sy < 0 || sy >= h {
                continue;
            }
            for dx in x0..=x1 {
                let sx = x as isize + dx;
                if sx < 0 || sx >= w {
                    continue;
                }
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                let p = src.get_pixel(sx as u32, sy as u32)[0];
                acc = pick(acc, p);
            }
        }
        Luma([acc])
    })
}

/// Grayscale erosion (neighborhood minimum).
#[must_use]
pub fn erode(src: &GrayImage, kernel: RectKernel) -> GrayImage {
    morph(src, kernel, u8::min, u8::MAX)
}

/// Grayscale dilation (neighborhood maximum).
#[must_use]
pub fn dilate(src: &GrayImage, kernel: RectKernel) -> GrayImage {
    morph(src, kernel, u8::max, u8::MIN)
}

/// Morphological opening: erosion followed by dilation.
#[must_use]
pub fn open(src: &GrayImage, kernel: RectKernel) -> GrayImage {
    dilate(&erode(src, kernel), kernel)
}
