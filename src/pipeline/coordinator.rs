//! Input collection and batch-level detection.

use crate::constants::AUDIO_EXTENSIONS;
use crate::error::{Error, Result};
use crate::output::progress;
use crate::pipeline::{AnalysisOptions, Batch, BatchDriver, BatchEntry, analyze_file};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Collect input files from paths (files and directories).
///
/// Directories are searched recursively; files are returned sorted so
/// that batches are reproducible.
pub fn collect_input_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_audio_file(path) {
                files.push(path.clone());
            } else {
                warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            let mut found = Vec::new();
            collect_audio_files_recursive(path, &mut found)?;
            found.sort();
            files.extend(found);
        } else {
            warn!("Skipping non-existent path: {}", path.display());
        }
    }

    Ok(files)
}

fn collect_audio_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            collect_audio_files_recursive(&path, files)?;
        } else if is_audio_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

/// Check if a file has a supported audio extension.
#[must_use]
pub fn is_audio_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        AUDIO_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(OsStr::new(allowed)))
    })
}

impl BatchDriver {
    /// Start a new batch holding `files` without analyzing them.
    pub fn collect(&mut self, files: &[PathBuf]) -> &Batch {
        self.begin();
        let batch = self.current_mut();
        for file in files {
            batch.push(BatchEntry::pending(file));
        }
        self.batch()
    }

    /// Start a new batch and analyze every file in it.
    ///
    /// The cancel token is checked between files. On cancellation the
    /// partial entries are discarded and [`Error::Cancelled`] returned.
    pub fn detect_batch(
        &mut self,
        files: &[PathBuf],
        options: &AnalysisOptions,
        show_progress: bool,
    ) -> Result<&Batch> {
        if files.is_empty() {
            return Err(Error::NoValidAudioFiles);
        }

        let generation = self.begin();
        info!("Batch {generation}: analyzing {} file(s)", files.len());
        let pb = progress::create_file_progress(files.len(), show_progress);

        for file in files {
            if self.cancel_token().is_cancelled() {
                progress::abandon_progress(pb, "Cancelled");
                self.discard();
                return Err(Error::Cancelled { generation });
            }

            let entry = analyze_file(file, options);
            self.current_mut().push(entry);
            progress::inc_progress(pb.as_ref());
        }

        progress::finish_progress(pb, "Analysis complete");
        Ok(self.batch())
    }
}
