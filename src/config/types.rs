//! Configuration type definitions.

use crate::consensus::ConsensusParams;
use crate::constants::output;
use crate::detect::DetectorParams;
use crate::spectral::SpectrogramParams;
use crate::splitter::SegmentNames;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Spectral transform settings.
    pub spectrogram: SpectrogramParams,

    /// Click detector settings.
    pub detection: DetectorParams,

    /// Consensus settings.
    pub consensus: ConsensusParams,

    /// Output settings.
    pub output: OutputConfig,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for split runs.
    pub output_dir: PathBuf,

    /// Half directory and suffix naming.
    #[serde(flatten)]
    pub names: SegmentNames,

    /// Package each run into a ZIP archive.
    pub zip: bool,

    /// Directory for spectrogram images (unset = no images).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectrogram_dir: Option<PathBuf>,

    /// Format of detection reports.
    pub report_format: ReportFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(output::DEFAULT_OUTPUT_DIR),
            names: SegmentNames::default(),
            zip: false,
            spectrogram_dir: None,
            report_format: ReportFormat::default(),
        }
    }
}

/// Supported detection report formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One row per file plus a consensus row.
    #[default]
    Csv,
    /// A single JSON document.
    Json,
}

impl ReportFormat {
    /// File extension for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("csv".parse::<ReportFormat>().ok(), Some(ReportFormat::Csv));
        assert_eq!("JSON".parse::<ReportFormat>().ok(), Some(ReportFormat::Json));
        assert!("xml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_report_format_display() {
        assert_eq!(ReportFormat::Csv.to_string(), "csv");
        assert_eq!(ReportFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_output_defaults() {
        let output = OutputConfig::default();
        assert_eq!(output.output_dir, PathBuf::from("output"));
        assert_eq!(output.names.first_dir, "Clockwise");
        assert_eq!(output.names.second_suffix, "acw");
        assert!(!output.zip);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[detection]"));
        assert!(text.contains("first_dir = \"Clockwise\""));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let parsed: Config = toml::from_str("[detection]\nwindow_start = 4.0\n").unwrap();
        assert_eq!(parsed.detection.window_start, 4.0);
        assert_eq!(parsed.detection.window_end, 7.0);
        assert_eq!(parsed.spectrogram.n_mels, 128);
    }
}
