//! Configuration validation.

use crate::config::Config;
use crate::detect::imaging::gaussian_taps;
use crate::error::{Error, Result};

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_spectrogram(config)?;
    validate_detection(config)?;
    validate_consensus(config)?;
    validate_output(config)?;
    Ok(())
}

fn validate_spectrogram(config: &Config) -> Result<()> {
    let s = &config.spectrogram;

    if s.sample_rate == 0 {
        return Err(invalid("spectrogram.sample_rate must be positive"));
    }
    if s.n_fft < 2 || !s.n_fft.is_multiple_of(2) {
        return Err(invalid(format!(
            "spectrogram.n_fft must be an even number of at least 2, got {}",
            s.n_fft
        )));
    }
    if s.hop_length == 0 {
        return Err(invalid("spectrogram.hop_length must be at least 1"));
    }
    if s.n_mels == 0 {
        return Err(invalid("spectrogram.n_mels must be at least 1"));
    }

    #[allow(clippy::cast_precision_loss)]
    let nyquist = s.sample_rate as f32 / 2.0;
    if !(s.fmax > 0.0 && s.fmax <= nyquist) {
        return Err(invalid(format!(
            "spectrogram.fmax must be in (0, {nyquist}], got {}",
            s.fmax
        )));
    }
    if !(s.top_db > 0.0) {
        return Err(invalid(format!(
            "spectrogram.top_db must be positive, got {}",
            s.top_db
        )));
    }

    Ok(())
}

fn validate_detection(config: &Config) -> Result<()> {
    let d = &config.detection;

    if d.window().is_none() {
        return Err(invalid(format!(
            "detection window {}-{} must have start before end",
            d.window_start, d.window_end
        )));
    }
    if gaussian_taps(d.blur_kernel).is_none() {
        return Err(invalid(format!(
            "detection.blur_kernel must be 1, 3, 5 or 7, got {}",
            d.blur_kernel
        )));
    }
    if d.kernel_width == 0 || d.kernel_height == 0 {
        return Err(invalid("detection kernel dimensions must be at least 1"));
    }
    if !(d.min_start <= d.max_start) {
        return Err(invalid(format!(
            "detection.min_start ({}) must not exceed max_start ({})",
            d.min_start, d.max_start
        )));
    }
    if !(d.min_duration > 0.0) {
        return Err(invalid(format!(
            "detection.min_duration must be positive, got {}",
            d.min_duration
        )));
    }
    if !(d.max_end > d.min_start) {
        return Err(invalid(format!(
            "detection.max_end ({}) must be after min_start ({})",
            d.max_end, d.min_start
        )));
    }

    Ok(())
}

fn validate_consensus(config: &Config) -> Result<()> {
    let c = &config.consensus;

    if !(c.default_start.is_finite() && c.default_end.is_finite())
        || c.default_start < 0.0
        || c.default_start >= c.default_end
    {
        return Err(invalid(format!(
            "consensus default {}-{} must be a non-negative interval with start before end",
            c.default_start, c.default_end
        )));
    }
    if c.decimals > 15 {
        return Err(invalid(format!(
            "consensus.decimals must be at most 15, got {}",
            c.decimals
        )));
    }

    Ok(())
}

fn validate_output(config: &Config) -> Result<()> {
    let names = &config.output.names;

    for (key, value) in [
        ("first_dir", &names.first_dir),
        ("second_dir", &names.second_dir),
        ("first_suffix", &names.first_suffix),
        ("second_suffix", &names.second_suffix),
    ] {
        if value.trim().is_empty() {
            return Err(invalid(format!("output.{key} must not be empty")));
        }
    }
    if names.first_dir == names.second_dir && names.first_suffix == names.second_suffix {
        return Err(invalid(
            "output halves would overwrite each other: directories and suffixes are identical",
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let mut config = Config::default();
        config.detection.window_start = 7.0;
        config.detection.window_end = 5.0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("window"));
    }

    #[test]
    fn test_even_blur_kernel_rejected() {
        let mut config = Config::default();
        config.detection.blur_kernel = 4;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let mut config = Config::default();
        config.spectrogram.hop_length = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.spectrogram.n_mels = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.detection.kernel_height = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_odd_n_fft_rejected() {
        let mut config = Config::default();
        config.spectrogram.n_fft = 2049;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("n_fft"));
    }

    #[test]
    fn test_fmax_above_nyquist_rejected() {
        let mut config = Config::default();
        config.spectrogram.fmax = 12_000.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_inverted_clamps_rejected() {
        let mut config = Config::default();
        config.detection.min_start = 6.5;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.detection.min_duration = 0.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_inverted_consensus_default_rejected() {
        let mut config = Config::default();
        config.consensus.default_end = 5.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_colliding_output_names_rejected() {
        let mut config = Config::default();
        config.output.names.second_dir = config.output.names.first_dir.clone();
        config.output.names.second_suffix = config.output.names.first_suffix.clone();
        assert!(validate_config(&config).is_err());
    }
}
