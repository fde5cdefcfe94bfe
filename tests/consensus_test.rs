//! Consensus tests against the public API.

use clicksplit::consensus::{ConsensusInput, ConsensusParams, consensus};
use clicksplit::detect::{DetectedInterval, Detection};

fn refined(start: f64, end: f64) -> ConsensusInput {
    ConsensusInput::from_detection(&Detection::Refined(DetectedInterval::new(start, end).unwrap()))
}

#[test]
fn test_no_detections_give_default() {
    let inputs = [
        ConsensusInput::from_detection(&Detection::NoDetection),
        ConsensusInput::from_detection(&Detection::NoDetection),
    ];
    let c = consensus(&inputs, &ConsensusParams::default());
    assert!(c.is_default);
    assert!((c.start - 5.5).abs() < 1e-12);
    assert!((c.end - 6.5).abs() < 1e-12);
}

#[test]
fn test_three_file_batch() {
    let inputs = [refined(5.4, 6.2), refined(5.6, 6.6), refined(5.5, 6.4)];
    let c = consensus(&inputs, &ConsensusParams::default());
    assert!((c.start - 5.5).abs() < 1e-12);
    assert!((c.end - 6.4).abs() < 1e-12);
    assert_eq!(c.contributors, 3);
}

#[test]
fn test_fallback_detections_contribute() {
    let window = DetectedInterval::new(5.0, 7.0).unwrap();
    let inputs = [
        ConsensusInput::from_detection(&Detection::Fallback(window)),
        refined(6.0, 7.0),
    ];
    let c = consensus(&inputs, &ConsensusParams::default());
    assert!((c.start - 5.5).abs() < 1e-12);
    assert!((c.end - 7.0).abs() < 1e-12);
}

#[test]
fn test_custom_default_and_precision() {
    let params = ConsensusParams {
        default_start: 4.0,
        default_end: 8.0,
        decimals: 1,
    };
    assert!((consensus(&[], &params).start - 4.0).abs() < 1e-12);

    let c = consensus(&[refined(5.24, 6.0), refined(5.3, 6.0)], &params);
    assert!((c.start - 5.3).abs() < 1e-12);
}
