//! Clicksplit - switch-click detection and splitting for rotation recordings.
//!
//! Each recording of a rotating measurement carries an audible switch
//! click near its middle. This crate finds the click on a mel
//! spectrogram, agrees on one interval for a batch of recordings, and
//! removes it to split every recording into two halves.

#![warn(missing_docs)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod consensus;
pub mod constants;
pub mod detect;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod spectral;
pub mod splitter;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, DetectArgs, GlobalArgs, OutputArgs, ReportArgs, RunArgs};
use cli::{SplitArgs, WindowArgs};
use config::{
    Config, config_file_path, load_default_config, save_default_config, validate_config,
};
use output::{BatchReport, save_report};
use pipeline::{AnalysisOptions, BatchDriver, CancelToken, collect_input_files};
use splitter::{SplitOptions, SplitSummary, validate_interval};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

pub use error::{Error, Result};

/// Main entry point for the clicksplit CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet);

    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel);

    handle_command(cli.command, &cli.global, cancel)
}

fn install_interrupt_handler(cancel: &CancelToken) {
    let token = cancel.clone();
    // First Ctrl+C stops after the current file; a second one exits.
    if let Err(e) = ctrlc::set_handler(move || {
        if token.is_cancelled() {
            std::process::exit(130); // 128 + SIGINT(2)
        }
        token.cancel();
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn handle_command(command: Command, global: &GlobalArgs, cancel: CancelToken) -> Result<()> {
    if let Command::Config { action } = command {
        return handle_config_command(action, global);
    }

    let config = load_default_config(global.config.as_deref())?;
    validate_config(&config)?;
    let mut driver = BatchDriver::new(cancel);

    match command {
        Command::Detect(args) => handle_detect(&args, &config, global, &mut driver),
        Command::Split(args) => handle_split(&args, &config, global, &mut driver),
        Command::Run(args) => handle_run(&args, &config, global, &mut driver),
        Command::Config { action } => handle_config_command(action, global),
    }
}

fn analysis_options(config: &Config, window: &WindowArgs, report: &ReportArgs) -> AnalysisOptions {
    let detection = config.detection.clone().with_window(
        window.window_start.unwrap_or(config.detection.window_start),
        window.window_end.unwrap_or(config.detection.window_end),
    );
    AnalysisOptions {
        spectrogram: config.spectrogram.clone(),
        detection,
        spectrogram_dir: report
            .spectrograms
            .clone()
            .or_else(|| config.output.spectrogram_dir.clone()),
    }
}

fn split_options(config: &Config, output: &OutputArgs) -> SplitOptions {
    SplitOptions {
        output_root: output
            .output_dir
            .clone()
            .unwrap_or_else(|| config.output.output_dir.clone()),
        names: config.output.names.clone(),
        zip: output.zip || config.output.zip,
    }
}

fn collect_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let files = collect_input_files(inputs)?;
    if files.is_empty() {
        return Err(Error::NoValidAudioFiles);
    }
    info!("Found {} audio file(s) to process", files.len());
    Ok(files)
}

/// Analyze the files, print the report and return the consensus bounds.
fn detect_and_report(
    inputs: &[PathBuf],
    window: &WindowArgs,
    report_args: &ReportArgs,
    config: &Config,
    global: &GlobalArgs,
    driver: &mut BatchDriver,
) -> Result<(f64, f64)> {
    let files = collect_files(inputs)?;
    let options = analysis_options(config, window, report_args);
    if let Some(window) = options.detection.window() {
        info!(
            "Searching {:.2}-{:.2}s for the switch click",
            window.start(),
            window.end()
        );
    }

    driver.detect_batch(&files, &options, global.show_progress())?;
    let report = BatchReport::from_batch(driver.batch(), &config.consensus);
    report.log_table();

    if let Some(path) = &report_args.report {
        let format = report_args
            .report_format
            .unwrap_or(config.output.report_format);
        save_report(&report, path, format)?;
        info!("Wrote {format} report to {}", path.display());
    }

    let failed = driver
        .batch()
        .entries()
        .iter()
        .filter(|e| !e.status.is_usable())
        .count();
    if failed > 0 {
        warn!("{failed} file(s) could not be analyzed");
    }

    Ok((report.consensus.start, report.consensus.end))
}

fn handle_detect(
    args: &DetectArgs,
    config: &Config,
    global: &GlobalArgs,
    driver: &mut BatchDriver,
) -> Result<()> {
    let total_start = Instant::now();
    detect_and_report(&args.inputs, &args.window, &args.report, config, global, driver)?;
    info!(
        "Complete: {} file(s) in {:.2}s",
        driver.batch().len(),
        total_start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn handle_split(
    args: &SplitArgs,
    config: &Config,
    global: &GlobalArgs,
    driver: &mut BatchDriver,
) -> Result<()> {
    validate_interval(args.start, args.end)?;
    let files = collect_files(&args.inputs)?;

    driver.collect(&files);
    let summary = driver.split_batch(
        driver.batch(),
        (args.start, args.end),
        &split_options(config, &args.output),
        global.show_progress(),
    )?;
    report_split(&summary);
    Ok(())
}

fn handle_run(
    args: &RunArgs,
    config: &Config,
    global: &GlobalArgs,
    driver: &mut BatchDriver,
) -> Result<()> {
    let total_start = Instant::now();
    if let Some((start, end)) = args.interval_override() {
        validate_interval(start, end)?;
    }

    let consensus = detect_and_report(
        &args.inputs,
        &args.window,
        &args.report,
        config,
        global,
        driver,
    )?;
    let interval = match args.interval_override() {
        Some(interval) => {
            info!(
                "Using operator interval {:.2}-{:.2}s instead of consensus {:.2}-{:.2}s",
                interval.0, interval.1, consensus.0, consensus.1
            );
            interval
        }
        None => consensus,
    };

    let summary = driver.split_batch(
        driver.batch(),
        interval,
        &split_options(config, &args.output),
        global.show_progress(),
    )?;
    report_split(&summary);
    info!(
        "Complete in {:.2}s",
        total_start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn report_split(summary: &SplitSummary) {
    let location = summary.archive.as_ref().unwrap_or(&summary.run_dir);
    info!(
        "Removed {:.2}-{:.2}s: {} processed, {} failed, output in {}",
        summary.start,
        summary.end,
        summary.processed(),
        summary.failed(),
        location.display()
    );
    if summary.failed() > 0 {
        warn!("{} file(s) could not be split", summary.failed());
    }
}

fn handle_config_command(action: ConfigAction, global: &GlobalArgs) -> Result<()> {
    let explicit = global.config.as_deref();

    match action {
        ConfigAction::Init => {
            let path = config_file_path(explicit)?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let saved_path = save_default_config(&Config::default(), explicit)?;
                println!("Created configuration file: {}", saved_path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config(explicit)?;
            let text = toml::to_string_pretty(&config)
                .map_err(|e| Error::ConfigSerialize { source: e })?;
            println!("{text}");
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", config_file_path(explicit)?.display());
            Ok(())
        }
    }
}
