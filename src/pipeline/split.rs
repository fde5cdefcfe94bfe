//! Batch splitting.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::audio::decode_audio_file;
use crate::error::{Error, Result};
use crate::output::{package_run, progress};
use crate::pipeline::{Batch, BatchDriver, BatchEntry};
use crate::splitter::{
    SegmentWriter, SplitOptions, SplitResult, SplitSummary, sanitize_filename, split_audio,
    validate_interval,
};

impl BatchDriver {
    /// Remove `[start, end)` seconds from every usable file in `batch` and
    /// write the two halves of each.
    ///
    /// The interval shape is checked before anything is written. Files
    /// that fail to decode, are too short for the interval, or cannot be
    /// written are recorded as failures and the batch continues. Recordings
    /// that share a stem get a numeric suffix so no output is overwritten.
    /// A cancelled split removes its run directory.
    pub fn split_batch(
        &self,
        batch: &Batch,
        (start, end): (f64, f64),
        options: &SplitOptions,
        show_progress: bool,
    ) -> Result<SplitSummary> {
        if !self.is_current(batch) {
            return Err(Error::StaleBatch {
                got: batch.generation(),
                current: self.batch().generation(),
            });
        }
        validate_interval(start, end)?;

        let run_dir = options.run_dir(batch.created());
        fs::create_dir_all(&run_dir).map_err(|e| Error::OutputDirCreateFailed {
            path: run_dir.clone(),
            source: e,
        })?;
        info!(
            "Removing {start:.2}-{end:.2}s from {} file(s) into {}",
            batch.len(),
            run_dir.display()
        );

        let writer = SegmentWriter::new(run_dir.clone(), options.names.clone());
        let pb = progress::create_file_progress(batch.len(), show_progress);
        let mut results = Vec::with_capacity(batch.len());
        let mut stems = HashSet::new();

        for entry in batch.entries() {
            if self.cancel_token().is_cancelled() {
                progress::abandon_progress(pb, "Cancelled");
                discard_run(&run_dir);
                return Err(Error::Cancelled {
                    generation: batch.generation(),
                });
            }

            let result = split_entry(entry, start, end, &writer, &mut stems);
            if let SplitResult::Failed { source, reason } = &result {
                warn!("Failed to split {}: {reason}", source.display());
            }
            results.push(result);
            progress::inc_progress(pb.as_ref());
        }
        progress::finish_progress(pb, "Split complete");

        let archive = if options.zip {
            Some(package_run(&run_dir, &options.archive_path(batch.created()))?)
        } else {
            None
        };

        let summary = SplitSummary {
            start,
            end,
            run_dir,
            archive,
            results,
        };
        info!(
            "Split {} file(s), {} failed",
            summary.processed(),
            summary.failed()
        );
        Ok(summary)
    }
}

fn discard_run(run_dir: &Path) {
    match fs::remove_dir_all(run_dir) {
        Ok(()) => info!("Removed partial output {}", run_dir.display()),
        Err(e) => warn!("Partial output left in {}: {e}", run_dir.display()),
    }
}

/// Reserve an output stem not yet used in this run.
fn unique_stem(stems: &mut HashSet<String>, stem: &str) -> String {
    let base = sanitize_filename(stem);
    let mut candidate = base.clone();
    let mut n = 2;
    while !stems.insert(candidate.to_lowercase()) {
        candidate = format!("{base}_{n}");
        n += 1;
    }
    candidate
}

fn split_entry(
    entry: &BatchEntry,
    start: f64,
    end: f64,
    writer: &SegmentWriter,
    stems: &mut HashSet<String>,
) -> SplitResult {
    let failed = |reason: String| SplitResult::Failed {
        source: entry.path.clone(),
        reason,
    };

    if !entry.status.is_usable() {
        return failed(format!("skipped: {}", entry.status.label()));
    }

    let stem = unique_stem(stems, &entry.stem());
    if stem != sanitize_filename(&entry.stem()) {
        warn!(
            "Output name for {} already used, writing as {stem}",
            entry.path.display()
        );
    }

    let outputs = decode_audio_file(&entry.path)
        .and_then(|audio| split_audio(&audio, start, end))
        .and_then(|halves| writer.write_halves(&stem, &halves));

    match outputs {
        Ok(outputs) => SplitResult::Written {
            source: entry.path.clone(),
            outputs,
        },
        Err(e) => failed(e.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pipeline::CancelToken;
    use crate::splitter::SegmentRole;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn write_tone(path: &Path, samples: usize) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..samples {
            let v = if i % 2 == 0 { 1000i16 } else { -1000 };
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn options(root: &Path) -> SplitOptions {
        SplitOptions {
            output_root: root.to_path_buf(),
            ..SplitOptions::default()
        }
    }

    #[test]
    fn test_split_batch_writes_halves() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("rec.wav");
        write_tone(&input, 8000 * 4 + 1);

        let mut driver = BatchDriver::new(CancelToken::new());
        driver.collect(&[input]);
        let summary = driver
            .split_batch(driver.batch(), (1.0, 2.0), &options(&dir.path().join("out")), false)
            .unwrap();

        assert_eq!(summary.processed(), 1);
        let SplitResult::Written { outputs, .. } = &summary.results[0] else {
            panic!("expected a written result");
        };
        let first = hound::WavReader::open(&outputs.first).unwrap().len();
        let second = hound::WavReader::open(&outputs.second).unwrap().len();
        assert_eq!(first + second, 8000 * 3 + 1);
        assert_eq!(second - first, 1);
        assert!(outputs.first.starts_with(&summary.run_dir));
    }

    #[test]
    fn test_inverted_interval_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let mut driver = BatchDriver::new(CancelToken::new());
        driver.collect(&[PathBuf::from("rec.wav")]);

        let err = driver
            .split_batch(driver.batch(), (7.0, 5.0), &options(&out), false)
            .unwrap_err();
        assert!(matches!(err, Error::IntervalValidation { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_short_file_fails_alone() {
        let dir = TempDir::new().unwrap();
        let long = dir.path().join("long.wav");
        let short = dir.path().join("short.wav");
        write_tone(&long, 8000 * 4);
        write_tone(&short, 8000);

        let mut driver = BatchDriver::new(CancelToken::new());
        driver.collect(&[long, short]);
        let summary = driver
            .split_batch(driver.batch(), (1.5, 2.5), &options(dir.path()), false)
            .unwrap();
        assert_eq!(summary.processed(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.results[1].is_written());
    }

    #[test]
    fn test_stale_batch_is_rejected() {
        let mut driver = BatchDriver::new(CancelToken::new());
        let old = driver.collect(&[PathBuf::from("a.wav")]).clone();
        driver.collect(&[PathBuf::from("b.wav")]);

        let err = driver
            .split_batch(&old, (1.0, 2.0), &SplitOptions::default(), false)
            .unwrap_err();
        assert!(matches!(err, Error::StaleBatch { got: 1, current: 2 }));
    }

    #[test]
    fn test_shared_stems_do_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        write_tone(&a.join("rec.wav"), 8000 * 3);
        write_tone(&b.join("rec.wav"), 8000 * 3);

        let mut driver = BatchDriver::new(CancelToken::new());
        driver.collect(&[a.join("rec.wav"), b.join("rec.wav")]);
        let summary = driver
            .split_batch(driver.batch(), (1.0, 1.5), &options(&dir.path().join("out")), false)
            .unwrap();

        assert_eq!(summary.processed(), 2);
        let first = summary.results[0].output(SegmentRole::First).unwrap();
        let second = summary.results[1].output(SegmentRole::First).unwrap();
        assert!(first.ends_with("Clockwise/rec_cw.wav"));
        assert!(second.ends_with("Clockwise/rec_2_cw.wav"));
        for result in &summary.results {
            assert!(result.output(SegmentRole::First).unwrap().exists());
            assert!(result.output(SegmentRole::Second).unwrap().exists());
        }
    }

    #[test]
    fn test_unique_stem_skips_taken_names() {
        let mut stems = HashSet::new();
        assert_eq!(unique_stem(&mut stems, "rec"), "rec");
        assert_eq!(unique_stem(&mut stems, "rec_2"), "rec_2");
        assert_eq!(unique_stem(&mut stems, "rec"), "rec_3");
        assert_eq!(unique_stem(&mut stems, "REC"), "REC_4");
    }

    #[test]
    fn test_cancelled_split_removes_run_dir() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("rec.wav");
        write_tone(&input, 8000 * 3);
        let out = dir.path().join("out");

        let cancel = CancelToken::new();
        let mut driver = BatchDriver::new(cancel.clone());
        driver.collect(&[input]);
        cancel.cancel();

        let err = driver
            .split_batch(driver.batch(), (1.0, 1.5), &options(&out), false)
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled { generation: 1 }));
        assert!(!options(&out).run_dir(driver.batch().created()).exists());
    }

    #[test]
    fn test_zip_packages_run() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("rec.wav");
        write_tone(&input, 8000 * 3);

        let mut driver = BatchDriver::new(CancelToken::new());
        driver.collect(&[input]);
        let opts = SplitOptions {
            zip: true,
            ..options(&dir.path().join("out"))
        };
        let summary = driver
            .split_batch(driver.batch(), (1.0, 1.5), &opts, false)
            .unwrap();
        assert!(summary.archive.as_ref().unwrap().exists());
        assert!(!summary.run_dir.exists());
    }
}
