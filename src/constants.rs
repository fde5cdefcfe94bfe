//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "clicksplit";

/// Supported audio file extensions for input collection.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac", "mp3", "m4a", "aac"];

/// Spectral transform defaults.
pub mod spectrogram {
    /// Canonical analysis sample rate in Hz.
    pub const SAMPLE_RATE: u32 = 22_050;

    /// FFT window length in samples.
    pub const N_FFT: usize = 2048;

    /// Hop between successive frames in samples.
    pub const HOP_LENGTH: usize = 512;

    /// Number of mel bands.
    pub const N_MELS: usize = 128;

    /// Upper frequency bound of the mel filterbank in Hz.
    pub const FMAX: f32 = 8000.0;

    /// Dynamic range kept below the loudest point, in dB.
    pub const TOP_DB: f32 = 80.0;

    /// Floor applied to power values before taking the logarithm.
    pub const AMIN: f32 = 1e-10;

    /// Duration reported when the time axis has fewer than two frames.
    pub const FALLBACK_DURATION: f64 = 12.0;
}

/// Click detector defaults.
pub mod detection {
    /// Coarse search window start in seconds.
    pub const WINDOW_START: f64 = 5.0;

    /// Coarse search window end in seconds.
    pub const WINDOW_END: f64 = 7.0;

    /// Gaussian blur kernel size (square, odd).
    pub const BLUR_KERNEL: usize = 5;

    /// Height of the vertical structuring element in rows.
    pub const KERNEL_HEIGHT: usize = 10;

    /// Lowest allowed detected start in seconds.
    pub const MIN_START: f64 = 4.5;

    /// Highest allowed detected start in seconds.
    pub const MAX_START: f64 = 6.0;

    /// Shortest allowed click duration in seconds.
    pub const MIN_DURATION: f64 = 0.5;

    /// Latest allowed detected end in seconds.
    pub const MAX_END: f64 = 7.5;
}

/// Consensus aggregation defaults.
pub mod consensus {
    /// Start used when no file produced a usable detection.
    pub const DEFAULT_START: f64 = 5.5;

    /// End used when no file produced a usable detection.
    pub const DEFAULT_END: f64 = 6.5;

    /// Decimal places kept in the consensus interval.
    pub const DECIMALS: u32 = 2;
}

/// Split output naming.
pub mod output {
    /// Default root directory for split runs.
    pub const DEFAULT_OUTPUT_DIR: &str = "output";

    /// Directory for the first half of each recording.
    pub const FIRST_DIR: &str = "Clockwise";

    /// Directory for the second half of each recording.
    pub const SECOND_DIR: &str = "Anticlockwise";

    /// Filename suffix for the first half.
    pub const FIRST_SUFFIX: &str = "cw";

    /// Filename suffix for the second half.
    pub const SECOND_SUFFIX: &str = "acw";

    /// Prefix of per-run output directories.
    pub const RUN_DIR_PREFIX: &str = "batch_";

    /// Prefix of packaged archives.
    pub const ZIP_PREFIX: &str = "processed_audio_";

    /// Timestamp format used in run directory and archive names.
    pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

    /// Extension of rendered spectrogram images.
    pub const SPECTROGRAM_EXTENSION: &str = ".png";

    /// Upscale factor applied to rendered spectrogram pixels.
    pub const SPECTROGRAM_SCALE: u32 = 3;
}
