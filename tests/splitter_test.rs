//! Splitting tests against the public API.

use clicksplit::Error;
use clicksplit::audio::{DecodedAudio, decode_audio_file};
use clicksplit::splitter::{
    SegmentNames, SegmentWriter, cut_points, excise, split_audio, split_halves,
};
use tempfile::TempDir;

fn ramp(len: usize, sample_rate: u32) -> DecodedAudio {
    #[allow(clippy::cast_precision_loss)]
    let samples = (0..len).map(|i| i as f32 / len as f32).collect();
    DecodedAudio::new(samples, sample_rate)
}

#[test]
fn test_excise_removes_exact_span() {
    let audio = ramp(22_050 * 12, 22_050);
    let (a, b) = cut_points(audio.samples.len(), audio.sample_rate, 5.5, 6.4).unwrap();
    let rest = excise(&audio.samples, a, b);
    assert_eq!(rest.len(), audio.samples.len() - (b - a));
    assert_eq!(rest[a - 1], audio.samples[a - 1]);
    assert_eq!(rest[a], audio.samples[b]);
}

#[test]
fn test_halves_cover_the_remainder() {
    for len in [22_050 * 12, 22_050 * 12 + 1, 22_050 * 10 + 7] {
        let audio = ramp(len, 22_050);
        let halves = split_audio(&audio, 5.5, 6.4).unwrap();
        let (a, b) = cut_points(len, 22_050, 5.5, 6.4).unwrap();
        let remaining = len - (b - a);

        assert_eq!(halves.first.len() + halves.second.len(), remaining);
        assert_eq!(halves.first.len(), remaining / 2);
        assert!(halves.second.len() - halves.first.len() <= 1);
    }
}

#[test]
fn test_split_halves_of_empty_input() {
    let (first, second) = split_halves(&[]);
    assert!(first.is_empty() && second.is_empty());
}

#[test]
fn test_inverted_interval_is_rejected() {
    let audio = ramp(22_050 * 12, 22_050);
    let err = split_audio(&audio, 7.0, 5.0).unwrap_err();
    assert!(matches!(err, Error::IntervalValidation { .. }));
}

#[test]
fn test_out_of_bounds_interval_is_rejected() {
    let audio = ramp(22_050 * 4, 22_050);
    assert!(matches!(
        split_audio(&audio, 5.5, 6.4),
        Err(Error::IntervalValidation { .. })
    ));
}

#[test]
fn test_rejected_interval_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let run = dir.path().join("run");
    let writer = SegmentWriter::new(run.clone(), SegmentNames::default());
    let audio = ramp(22_050 * 4, 22_050);

    let result = split_audio(&audio, 7.0, 5.0).and_then(|h| writer.write_halves("rec", &h));
    assert!(result.is_err());
    assert!(!run.exists());
}

#[test]
fn test_written_halves_round_trip_lengths() {
    let dir = TempDir::new().unwrap();
    let writer = SegmentWriter::new(dir.path().to_path_buf(), SegmentNames::default());
    let audio = ramp(8_000 * 12 + 1, 8_000);
    let halves = split_audio(&audio, 5.5, 6.4).unwrap();
    let outputs = writer.write_halves("rec", &halves).unwrap();

    assert!(outputs.first.ends_with("Clockwise/rec_cw.wav"));
    assert!(outputs.second.ends_with("Anticlockwise/rec_acw.wav"));
    let first = hound::WavReader::open(&outputs.first).unwrap();
    let second = hound::WavReader::open(&outputs.second).unwrap();
    assert_eq!(first.len() as usize, halves.first.len());
    assert_eq!(second.len() as usize, halves.second.len());
}

#[test]
fn test_split_halves_are_sample_exact_copies() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("ramp.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let original: Vec<i16> = (0..8_000 * 4).map(|i| ((i * 37) % 65_536 - 32_768) as i16).collect();
    let mut wav = hound::WavWriter::create(&input, spec).unwrap();
    for &s in &original {
        wav.write_sample(s).unwrap();
    }
    wav.finalize().unwrap();

    let audio = decode_audio_file(&input).unwrap();
    let halves = split_audio(&audio, 1.0, 2.0).unwrap();
    let writer = SegmentWriter::new(dir.path().join("run"), SegmentNames::default());
    let outputs = writer.write_halves("ramp", &halves).unwrap();

    let read = |path: &std::path::Path| -> Vec<i16> {
        hound::WavReader::open(path)
            .unwrap()
            .samples::<i16>()
            .map(Result::unwrap)
            .collect()
    };
    let mut expected = original[..8_000].to_vec();
    expected.extend_from_slice(&original[16_000..]);
    let (first, second) = expected.split_at(expected.len() / 2);
    assert_eq!(read(&outputs.first), first);
    assert_eq!(read(&outputs.second), second);
}
