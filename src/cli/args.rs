//! CLI argument definitions.

use crate::cli::validators::parse_seconds;
use crate::config::ReportFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Find the switch click in rotation recordings and split them into
/// clockwise and anticlockwise passes.
#[derive(Debug, Parser)]
#[command(name = "clicksplit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by all subcommands.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by all subcommands.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable progress bars.
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Configuration file (default: platform config directory).
    #[arg(long, global = true, env = "CLICKSPLIT_CONFIG")]
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Whether progress bars should be drawn.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect the click in each file and report the batch consensus.
    Detect(DetectArgs),
    /// Remove a given interval from each file and split the rest in half.
    Split(SplitArgs),
    /// Detect, take the consensus (or an override) and split.
    Run(RunArgs),
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Coarse search window overrides.
#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// Start of the coarse search window in seconds.
    #[arg(long, value_parser = parse_seconds, env = "CLICKSPLIT_WINDOW_START")]
    pub window_start: Option<f64>,

    /// End of the coarse search window in seconds.
    #[arg(long, value_parser = parse_seconds, env = "CLICKSPLIT_WINDOW_END")]
    pub window_end: Option<f64>,
}

/// Detection report options.
#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Directory for spectrogram images.
    #[arg(long, env = "CLICKSPLIT_SPECTROGRAMS")]
    pub spectrograms: Option<PathBuf>,

    /// Write the detection report to this file.
    #[arg(long, env = "CLICKSPLIT_REPORT")]
    pub report: Option<PathBuf>,

    /// Report format (csv or json).
    #[arg(long, env = "CLICKSPLIT_REPORT_FORMAT")]
    pub report_format: Option<ReportFormat>,
}

/// Split output options.
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Root directory for split runs.
    #[arg(short, long, env = "CLICKSPLIT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Package the run into a ZIP archive.
    #[arg(long)]
    pub zip: bool,
}

/// Arguments for `detect`.
#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Input files or directories.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Coarse window overrides.
    #[command(flatten)]
    pub window: WindowArgs,

    /// Report options.
    #[command(flatten)]
    pub report: ReportArgs,
}

/// Arguments for `split`.
#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Input files or directories.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Start of the interval to remove, in seconds.
    #[arg(long, value_parser = parse_seconds)]
    pub start: f64,

    /// End of the interval to remove, in seconds.
    #[arg(long, value_parser = parse_seconds)]
    pub end: f64,

    /// Output options.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for `run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Input files or directories.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Remove this start instead of the consensus, in seconds.
    #[arg(long, value_parser = parse_seconds, requires = "end")]
    pub start: Option<f64>,

    /// Remove this end instead of the consensus, in seconds.
    #[arg(long, value_parser = parse_seconds, requires = "start")]
    pub end: Option<f64>,

    /// Coarse window overrides.
    #[command(flatten)]
    pub window: WindowArgs,

    /// Report options.
    #[command(flatten)]
    pub report: ReportArgs,

    /// Output options.
    #[command(flatten)]
    pub output: OutputArgs,
}

impl RunArgs {
    /// Operator override of the consensus interval, if both bounds were given.
    #[must_use]
    pub fn interval_override(&self) -> Option<(f64, f64)> {
        self.start.zip(self.end)
    }
}
