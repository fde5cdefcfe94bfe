//! Detector tests on synthetic recordings.

use clicksplit::detect::{DetectorParams, Detection, detect_click};
use clicksplit::spectral::{SpectrogramParams, compute_mel_spectrogram};

const SR: u32 = 22_050;

/// 12 s of quiet noise with a loud broadband burst starting at `click_at`.
fn recording(click_at: f64, click_len: f64) -> Vec<f32> {
    let mut state = 0x1234_5678_u32;
    let mut noise = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (f64::from(state >> 8) / f64::from(1u32 << 24)) as f32 * 2.0 - 1.0
    };

    let len = SR as usize * 12;
    let start = (click_at * f64::from(SR)) as usize;
    let end = ((click_at + click_len) * f64::from(SR)) as usize;
    (0..len)
        .map(|i| {
            let level = if (start..end).contains(&i) { 0.5 } else { 0.001 };
            noise() * level
        })
        .collect()
}

#[test]
fn test_click_is_found_inside_bounds() {
    let samples = recording(5.9, 0.2);
    let spectrogram =
        compute_mel_spectrogram(&samples, SR, &SpectrogramParams::default()).unwrap();

    let detection = detect_click(&spectrogram, &DetectorParams::default());
    let Detection::Refined(interval) = detection else {
        panic!("expected a refined detection, got {detection:?}");
    };
    assert!(interval.start() >= 4.5 && interval.start() <= 6.0);
    assert!(interval.end() <= 7.5);
    assert!(interval.start() < interval.end());
    assert!((5.7..=6.0).contains(&interval.start()), "start {}", interval.start());
    assert!(interval.duration() >= 0.5 - 1e-9);
}

#[test]
fn test_later_click_moves_the_interval() {
    let params = SpectrogramParams::default();
    let early = compute_mel_spectrogram(&recording(5.4, 0.2), SR, &params).unwrap();
    let late = compute_mel_spectrogram(&recording(5.9, 0.2), SR, &params).unwrap();

    let detector = DetectorParams::default();
    let early = detect_click(&early, &detector).interval().unwrap();
    let late = detect_click(&late, &detector).interval().unwrap();
    assert!(early.start() < late.start());
}

#[test]
fn test_click_outside_window_is_not_refined_past_clamps() {
    let samples = recording(1.0, 0.2);
    let spectrogram =
        compute_mel_spectrogram(&samples, SR, &SpectrogramParams::default()).unwrap();

    let interval = detect_click(&spectrogram, &DetectorParams::default())
        .interval()
        .unwrap();
    assert!(interval.start() >= 4.5 && interval.start() <= 6.0);
    assert!(interval.end() <= 7.5);
}

#[test]
fn test_time_axis_matches_frames() {
    let samples = recording(5.9, 0.2);
    let spectrogram =
        compute_mel_spectrogram(&samples, SR, &SpectrogramParams::default()).unwrap();
    assert_eq!(spectrogram.times().len(), spectrogram.n_frames());
    assert_eq!(spectrogram.n_frames(), 1 + samples.len() / 512);
    assert_eq!(spectrogram.n_bands(), 128);
    assert!(spectrogram.times().windows(2).all(|w| w[0] < w[1]));
}
