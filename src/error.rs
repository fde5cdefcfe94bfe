//! Error types for clicksplit.

/// Result type alias for clicksplit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for clicksplit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// No valid audio files found.
    #[error("no valid audio files found in the provided paths")]
    NoValidAudioFiles,

    /// Failed to open audio file.
    #[error("failed to open audio file '{path}'")]
    AudioOpen {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to decode audio.
    #[error("failed to decode audio from '{path}'")]
    AudioDecode {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No audio tracks found.
    #[error("no audio tracks found in '{path}'")]
    NoAudioTracks {
        /// Path to the audio file.
        path: std::path::PathBuf,
    },

    /// Decoded audio contained no samples.
    #[error("audio contains no samples")]
    EmptyAudio,

    /// Failed to resample audio.
    #[error("failed to resample audio: {reason}")]
    Resample {
        /// Description of the resampling failure.
        reason: String,
    },

    /// Spectrogram computation failed.
    #[error("failed to compute spectrogram: {reason}")]
    Spectrogram {
        /// Description of the failure.
        reason: String,
    },

    /// Failed to write a rendered spectrogram image.
    #[error("failed to write spectrogram image '{path}'")]
    ImageWrite {
        /// Path to the image file.
        path: std::path::PathBuf,
        /// Underlying image error.
        #[source]
        source: image::ImageError,
    },

    /// Split interval is inverted or outside the audio.
    #[error("invalid split interval {start:.3}-{end:.3}s: {reason}")]
    IntervalValidation {
        /// Interval start in seconds.
        start: f64,
        /// Interval end in seconds.
        end: f64,
        /// Why the interval was rejected.
        reason: String,
    },

    /// Failed to write WAV file.
    #[error("failed to write WAV file '{path}'")]
    WavWriteFailed {
        /// Path to the WAV file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: hound::Error,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the ZIP package.
    #[error("failed to write ZIP package '{path}'")]
    ZipWrite {
        /// Path to the archive.
        path: std::path::PathBuf,
        /// Underlying ZIP error.
        #[source]
        source: zip::result::ZipError,
    },

    /// Failed to write a CSV report.
    #[error("failed to write CSV report '{path}'")]
    CsvWrite {
        /// Path to the report.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Failed to write JSON output file.
    #[error("failed to write JSON output file '{path}'")]
    JsonWrite {
        /// Path to the JSON file.
        path: std::path::PathBuf,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Batch was cancelled before it completed.
    #[error("batch {generation} was cancelled")]
    Cancelled {
        /// Generation of the abandoned batch.
        generation: u64,
    },

    /// A batch from an older generation was handed to a stage.
    #[error("batch generation {got} is stale (current is {current})")]
    StaleBatch {
        /// Generation of the batch that was passed in.
        got: u64,
        /// Generation currently owned by the driver.
        current: u64,
    },
}
