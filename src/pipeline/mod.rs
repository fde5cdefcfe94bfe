//! Processing pipeline components.

mod batch;
mod coordinator;
mod processor;
mod split;

pub use batch::{Batch, BatchDriver, BatchEntry, CancelToken, FileStatus};
pub use coordinator::{collect_input_files, is_audio_file};
pub use processor::{AnalysisOptions, analyze_file, spectrogram_path_for};
